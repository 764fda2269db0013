//! ICS document generation.
//!
//! This module renders events as a single RFC 5545 calendar: escaped TEXT
//! values, CRLF line endings and octet-based line folding.

mod fold;
mod generate;

pub use fold::{FOLD_LIMIT, fold_line};
pub use generate::{CalendarMetadata, generate_calendar};

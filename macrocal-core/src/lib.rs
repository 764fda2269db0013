//! Core of the US macro release calendar.
//!
//! This crate turns the BLS schedule page, the BEA release dates feed and the
//! built-in FOMC table into one ICS calendar:
//! - `sources` extract release instants from each upstream document
//! - `tz` moves instants from the publishing zone to the display zone
//! - `event` and `release` model the calendar entries
//! - `ics` renders the RFC 5545 document
//! - `pipeline` ties it together behind the `Fetch` seam

pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod pipeline;
pub mod release;
pub mod sources;
pub mod tz;

pub use config::Config;
pub use error::{MacroCalError, MacroCalResult};
pub use event::Event;
pub use pipeline::{GeneratedCalendar, build_events, generate, render_calendar};
pub use release::Release;
pub use sources::Fetch;

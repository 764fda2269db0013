//! Error types for the macro calendar pipeline.

use thiserror::Error;

/// Errors that abort a calendar run.
///
/// Malformed individual rows or entries never surface here; the extractors
/// skip them. Every variant that comes from a source carries enough context
/// (url, year, a sample of what was actually seen) to diagnose an upstream
/// format change without rerunning.
#[derive(Error, Debug)]
pub enum MacroCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetching {url} failed after {attempts} attempt(s): {message}")]
    Fetch {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("Schedule table not found at {url}; page structure may have changed")]
    TableNotFound { url: String },

    #[error(
        "No {category} releases for {year} found at {url}; sample of labels seen: [{}]",
        .sample.join(" | ")
    )]
    CategoryEmpty {
        url: String,
        category: String,
        year: i32,
        sample: Vec<String>,
    },

    #[error("Unexpected document at {url}: {reason}")]
    InvalidDocument { url: String, reason: String },

    #[error(
        "Release '{key}' not found at {url}; available keys include: [{}]",
        .available.join(" | ")
    )]
    ReleaseKeyNotFound {
        url: String,
        key: String,
        available: Vec<String>,
    },

    #[error("No hardcoded {category} dates for {year} (available years: {supported:?})")]
    UnsupportedYear {
        category: String,
        year: i32,
        supported: Vec<i32>,
    },

    #[error("{datetime} does not exist in {timezone}")]
    NonexistentLocalTime { datetime: String, timezone: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for macro calendar operations.
pub type MacroCalResult<T> = Result<T, MacroCalError>;

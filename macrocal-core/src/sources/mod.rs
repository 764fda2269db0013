//! Release-date sources.
//!
//! Each source turns one upstream document into sorted, deduplicated lists
//! of target-timezone instants. Parsing is pure; network access goes through
//! the [`Fetch`] seam so the pipeline can run against fixtures.

pub mod bea;
pub mod bls;
pub mod fomc;

use std::future::Future;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::MacroCalResult;

/// Maximum number of observed labels/keys quoted in a source-format error
pub(crate) const DIAGNOSTIC_SAMPLE: usize = 12;

/// Transport collaborator used by the pipeline.
///
/// Implementations own retries and backoff; an `Err` means the source is
/// unreachable and the whole run aborts.
pub trait Fetch {
    fn fetch_text(&self, url: &str) -> impl Future<Output = MacroCalResult<String>>;

    fn fetch_json(&self, url: &str) -> impl Future<Output = MacroCalResult<serde_json::Value>>;
}

/// Sort ascending and drop repeated instants.
pub(crate) fn sorted_unique(mut instants: Vec<DateTime<Tz>>) -> Vec<DateTime<Tz>> {
    instants.sort();
    instants.dedup();
    instants
}

/// Lowercase and collapse runs of whitespace for fuzzy label comparison.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

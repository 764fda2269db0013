//! Calendar event model.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use sha2::{Digest, Sha256};

/// Domain part of every generated UID
const UID_DOMAIN: &str = "macrocal";

/// One calendar entry, always expressed in the target timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// SUMMARY
    pub name: String,
    pub start: DateTime<Tz>,
    pub duration_minutes: i64,
    /// Provenance and local-time assumptions
    pub description: String,
    /// Short tags for client-side filtering (CATEGORIES)
    pub categories: Vec<String>,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        start: DateTime<Tz>,
        duration_minutes: i64,
        description: impl Into<String>,
        categories: &[&str],
    ) -> Self {
        Event {
            name: name.into(),
            start,
            duration_minutes,
            description: description.into(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.start + Duration::minutes(self.duration_minutes)
    }

    /// Stable UID derived from the title and start instant only.
    ///
    /// Regenerating the calendar yields the same UIDs, so subscribed clients
    /// update entries in place instead of duplicating them.
    pub fn uid(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update(b"|");
        hasher.update(self.start.to_rfc3339().as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        format!("fin-{}@{}", &digest[..20], UID_DOMAIN)
    }
}

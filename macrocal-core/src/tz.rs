//! Timestamp normalization between the publishing zone and the display zone.
//!
//! Conversions go through the absolute instant, never through wall-clock
//! arithmetic, so DST transitions in either zone are handled by chrono-tz.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{MacroCalError, MacroCalResult};

/// Attach `time` on `date` to `source`, then express that instant in `target`.
///
/// A wall-clock time that is ambiguous in `source` (the repeated hour when
/// DST ends) resolves to the earlier instant. A time that does not exist
/// (the skipped hour when DST starts) is an error.
pub fn localize(
    date: NaiveDate,
    time: NaiveTime,
    source: Tz,
    target: Tz,
) -> MacroCalResult<DateTime<Tz>> {
    let naive = date.and_time(time);

    let in_source = match source.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            return Err(MacroCalError::NonexistentLocalTime {
                datetime: naive.to_string(),
                timezone: source.name().to_string(),
            });
        }
    };

    Ok(in_source.with_timezone(&target))
}

/// Express an instant carrying any offset in `target`.
pub fn to_target<Z: TimeZone>(instant: &DateTime<Z>, target: Tz) -> DateTime<Tz> {
    instant.with_timezone(&target)
}

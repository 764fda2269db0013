//! FOMC rate decision days.
//!
//! The Fed calendar page is not reliably parseable, so decision (statement)
//! days are kept as a table keyed by year. Add a new year's row when the Fed
//! publishes its schedule.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use tracing::info;

use crate::config::Config;
use crate::error::{MacroCalError, MacroCalResult};
use crate::release::Release;
use crate::tz;

/// (year, [(month, day)]) for each scheduled statement day
const DECISION_DAYS: &[(i32, &[(u32, u32)])] = &[(
    2026,
    &[
        (1, 28),
        (3, 18),
        (4, 29),
        (6, 17),
        (7, 29),
        (9, 16),
        (10, 28),
        (12, 9),
    ],
)];

/// Years the built-in table covers.
pub fn supported_years() -> Vec<i32> {
    DECISION_DAYS.iter().map(|(year, _)| *year).collect()
}

/// Decision days for `year`, or `UnsupportedYear` if the table has no row.
pub fn decision_days(year: i32) -> MacroCalResult<Vec<NaiveDate>> {
    let (_, days) = DECISION_DAYS
        .iter()
        .find(|(y, _)| *y == year)
        .ok_or_else(|| MacroCalError::UnsupportedYear {
            category: Release::FomcDecision.to_string(),
            year,
            supported: supported_years(),
        })?;

    days.iter()
        .map(|&(month, day)| {
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                MacroCalError::Config(format!("invalid FOMC date {year}-{month:02}-{day:02}"))
            })
        })
        .collect()
}

/// Statement instants for `config.year`, in the target timezone.
pub fn decision_instants(config: &Config) -> MacroCalResult<Vec<DateTime<Tz>>> {
    let mut instants = decision_days(config.year)?
        .into_iter()
        .map(|date| {
            tz::localize(
                date,
                config.fomc.release_time,
                config.source_timezone,
                config.target_timezone,
            )
        })
        .collect::<MacroCalResult<Vec<_>>>()?;
    instants.sort();

    info!(count = instants.len(), "Loaded FOMC decision days");

    Ok(instants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Taipei;

    #[test]
    fn test_2026_has_eight_meetings() {
        let days = decision_days(2026).unwrap();
        assert_eq!(days.len(), 8);
        assert!(days.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2026, 1, 28).unwrap());
        assert_eq!(days[7], NaiveDate::from_ymd_opt(2026, 12, 9).unwrap());
    }

    #[test]
    fn test_unsupported_year_is_refused() {
        let err = decision_days(2027).unwrap_err();
        match err {
            MacroCalError::UnsupportedYear {
                year, supported, ..
            } => {
                assert_eq!(year, 2027);
                assert_eq!(supported, vec![2026]);
            }
            other => panic!("expected UnsupportedYear, got {other:?}"),
        }

        let mut config = Config::default();
        config.year = 2025;
        assert!(decision_instants(&config).is_err());
    }

    #[test]
    fn test_statement_time_converted_to_target() {
        let instants = decision_instants(&Config::default()).unwrap();

        // 14:00 EST on Jan 28 is 03:00 the next day in Taipei
        assert_eq!(
            instants[0],
            Taipei.with_ymd_and_hms(2026, 1, 29, 3, 0, 0).unwrap()
        );
        // 14:00 EDT on Jun 17
        assert_eq!(
            instants[3],
            Taipei.with_ymd_and_hms(2026, 6, 18, 2, 0, 0).unwrap()
        );
    }
}

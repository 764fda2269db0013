//! Release categories and their event templates.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::config::Config;
use crate::event::Event;

/// A macro data series tracked by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Release {
    /// BLS Consumer Price Index
    Cpi,
    /// BLS Employment Situation (nonfarm payrolls)
    EmploymentSituation,
    /// Fed FOMC rate decision statement
    FomcDecision,
    /// BEA Gross Domestic Product
    Gdp,
    /// BEA Personal Income and Outlays (includes PCE)
    PersonalIncomeOutlays,
}

impl Release {
    pub fn title(&self) -> &'static str {
        match self {
            Release::Cpi => "美國 CPI 公佈（BLS）",
            Release::EmploymentSituation => "美國 非農/就業報告 NFP（BLS Employment Situation）",
            Release::FomcDecision => "FOMC 利率決議聲明（Fed）",
            Release::Gdp => "美國 GDP 發布（BEA）",
            Release::PersonalIncomeOutlays => "美國 PCE/個人所得與支出（BEA）",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Release::Cpi => &["US", "CPI", "BLS"],
            Release::EmploymentSituation => &["US", "NFP", "BLS"],
            Release::FomcDecision => &["US", "FOMC", "Fed"],
            Release::Gdp => &["US", "GDP", "BEA"],
            Release::PersonalIncomeOutlays => &["US", "PCE", "BEA"],
        }
    }

    pub fn duration_minutes(&self, config: &Config) -> i64 {
        match self {
            Release::Cpi | Release::EmploymentSituation => config.bls.duration_minutes,
            Release::FomcDecision => config.fomc.duration_minutes,
            Release::Gdp | Release::PersonalIncomeOutlays => config.bea.duration_minutes,
        }
    }

    /// Provenance text, including the local-time assumption behind the start.
    pub fn description(&self, config: &Config) -> String {
        let year = config.year;
        let source_zone = zone_abbreviation(config.source_timezone);
        match self {
            Release::Cpi | Release::EmploymentSituation => format!(
                "來源：BLS schedule（{year}；{} {source_zone} 已換算台北時間）",
                config.bls.release_time.format("%H:%M")
            ),
            Release::FomcDecision => format!(
                "來源：Fed FOMC calendar（{year}；假設 {} {source_zone} 發布，已換算台北時間）",
                config.fomc.release_time.format("%H:%M")
            ),
            Release::Gdp => {
                format!("來源：BEA release_dates.json（{year}；UTC 時間已換算台北時間）")
            }
            Release::PersonalIncomeOutlays => format!(
                "來源：BEA release_dates.json（{year}；含 PCE；UTC 時間已換算台北時間）"
            ),
        }
    }

    /// Build the calendar entry for one release instant.
    pub fn event(&self, start: DateTime<Tz>, config: &Config) -> Event {
        Event::new(
            self.title(),
            start,
            self.duration_minutes(config),
            self.description(config),
            self.categories(),
        )
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Release::Cpi => "Consumer Price Index",
            Release::EmploymentSituation => "Employment Situation",
            Release::FomcDecision => "FOMC decision",
            Release::Gdp => "Gross Domestic Product",
            Release::PersonalIncomeOutlays => "Personal Income and Outlays",
        };
        f.write_str(name)
    }
}

fn zone_abbreviation(tz: Tz) -> &'static str {
    if tz == chrono_tz::America::New_York {
        "ET"
    } else {
        tz.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Taipei;

    #[test]
    fn test_event_uses_category_template() {
        let config = Config::default();
        let start = Taipei.with_ymd_and_hms(2026, 1, 29, 3, 0, 0).unwrap();
        let event = Release::FomcDecision.event(start, &config);

        assert_eq!(event.name, "FOMC 利率決議聲明（Fed）");
        assert_eq!(event.duration_minutes, 30);
        assert_eq!(event.categories, vec!["US", "FOMC", "Fed"]);
        assert_eq!(
            event.description,
            "來源：Fed FOMC calendar（2026；假設 14:00 ET 發布，已換算台北時間）"
        );
    }

    #[test]
    fn test_bls_description_reflects_configured_time() {
        let mut config = Config::default();
        config.bls.release_time = chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(
            Release::Cpi.description(&config),
            "來源：BLS schedule（2026；10:00 ET 已換算台北時間）"
        );
    }
}

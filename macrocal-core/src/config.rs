//! Run configuration.
//!
//! The defaults produce the 2026 Asia/Taipei calendar, so a run without a
//! config file needs no setup.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use chrono_tz::Tz;
use config::{Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{MacroCalError, MacroCalResult};

static DEFAULT_PRODUCT_ID: &str = "-//macrocal//US Macro Calendar//ZH-TW";
static DEFAULT_BLS_URL: &str = "https://www.bls.gov/schedule/{year}/home.htm";
static DEFAULT_BEA_URL: &str = "https://apps.bea.gov/API/signup/release_dates.json";
static DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Configuration for one calendar run.
///
/// Loaded from `~/.config/macrocal/config.toml` (or `--config <path>`), with
/// `MACROCAL_*` environment overrides on top. Missing keys fall back to the
/// defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub year: i32,

    /// Output file; defaults to `us-macro-<year>-taipei.ics`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Zone the agencies publish release times in
    pub source_timezone: Tz,

    /// Zone every event is expressed in
    pub target_timezone: Tz,

    /// Reminder lead times, applied to every event
    pub reminder_minutes: Vec<i64>,

    pub calendar: CalendarConfig,
    pub bls: BlsConfig,
    pub bea: BeaConfig,
    pub fomc: FomcConfig,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            year: 2026,
            output: None,
            source_timezone: chrono_tz::America::New_York,
            target_timezone: chrono_tz::Asia::Taipei,
            reminder_minutes: vec![30, 60],
            calendar: CalendarConfig::default(),
            bls: BlsConfig::default(),
            bea: BeaConfig::default(),
            fomc: FomcConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Calendar header values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub product_id: String,

    /// X-WR-CALNAME; defaults to `<year> 重大美國金融數據（Taipei）`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            name: None,
        }
    }
}

/// BLS release schedule page (CPI, Employment Situation)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlsConfig {
    /// Schedule page URL; `{year}` is substituted
    pub url: String,
    pub release_time: NaiveTime,
    pub duration_minutes: i64,
}

impl Default for BlsConfig {
    fn default() -> Self {
        BlsConfig {
            url: DEFAULT_BLS_URL.to_string(),
            release_time: hm(8, 30),
            duration_minutes: 15,
        }
    }
}

impl BlsConfig {
    pub fn url_for(&self, year: i32) -> String {
        self.url.replace("{year}", &year.to_string())
    }
}

/// BEA release dates feed (GDP, Personal Income and Outlays)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaConfig {
    pub url: String,
    pub gdp_key: String,
    pub personal_income_key: String,
    pub duration_minutes: i64,
}

impl Default for BeaConfig {
    fn default() -> Self {
        BeaConfig {
            url: DEFAULT_BEA_URL.to_string(),
            gdp_key: "Gross Domestic Product".to_string(),
            personal_income_key: "Personal Income and Outlays".to_string(),
            duration_minutes: 15,
        }
    }
}

/// FOMC statements (dates come from the built-in table)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FomcConfig {
    pub release_time: NaiveTime,
    pub duration_minutes: i64,
}

impl Default for FomcConfig {
    fn default() -> Self {
        FomcConfig {
            release_time: hm(14, 0),
            duration_minutes: 30,
        }
    }
}

/// Settings for the HTTP fetch collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Total attempts per URL, including the first
    pub retries: u32,
    /// Delay before the second attempt; doubles after each failure
    pub backoff_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: 30,
            retries: 3,
            backoff_ms: 1000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> MacroCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MacroCalError::Config("Could not determine config directory".into()))?
            .join("macrocal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration layered as defaults < TOML file < environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> MacroCalResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        let config: Config = config::Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix("MACROCAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| MacroCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MacroCalError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce a nonsensical calendar.
    pub fn validate(&self) -> MacroCalResult<()> {
        if !(1970..=9999).contains(&self.year) {
            return Err(MacroCalError::Config(format!("year {} out of range", self.year)));
        }
        if let Some(m) = self.reminder_minutes.iter().find(|m| **m < 0) {
            return Err(MacroCalError::Config(format!(
                "reminder lead time must be non-negative, got {m}"
            )));
        }
        for (name, minutes) in [
            ("bls", self.bls.duration_minutes),
            ("bea", self.bea.duration_minutes),
            ("fomc", self.fomc.duration_minutes),
        ] {
            if minutes < 0 {
                return Err(MacroCalError::Config(format!(
                    "{name}.duration_minutes must be non-negative, got {minutes}"
                )));
            }
        }
        if self.http.retries == 0 {
            return Err(MacroCalError::Config("http.retries must be at least 1".into()));
        }
        Ok(())
    }

    /// Output path with `~` expanded.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned()),
            None => PathBuf::from(format!("us-macro-{}-taipei.ics", self.year)),
        }
    }

    pub fn calendar_name(&self) -> String {
        self.calendar
            .name
            .clone()
            .unwrap_or_else(|| format!("{} 重大美國金融數據（Taipei）", self.year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.year, 2026);
        assert_eq!(config.source_timezone, chrono_tz::America::New_York);
        assert_eq!(config.target_timezone, chrono_tz::Asia::Taipei);
        assert_eq!(config.reminder_minutes, vec![30, 60]);
        assert_eq!(config.output_path(), PathBuf::from("us-macro-2026-taipei.ics"));
        assert_eq!(config.calendar_name(), "2026 重大美國金融數據（Taipei）");
        assert_eq!(
            config.bls.url_for(config.year),
            "https://www.bls.gov/schedule/2026/home.htm"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_layers_file_over_defaults() {
        let dir = std::env::temp_dir().join(format!("macrocal-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "year = 2027\nreminder_minutes = [10]\n\n[fomc]\nrelease_time = \"14:30:00\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.year, 2027);
        assert_eq!(config.reminder_minutes, vec![10]);
        assert_eq!(config.fomc.release_time, hm(14, 30));
        // Untouched sections keep their defaults
        assert_eq!(config.fomc.duration_minutes, 30);
        assert_eq!(config.bls.release_time, hm(8, 30));
        assert_eq!(config.output_path(), PathBuf::from("us-macro-2027-taipei.ics"));
    }

    #[test]
    fn test_load_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("macrocal-definitely-missing.toml");
        assert!(matches!(
            Config::load(Some(path.as_path())),
            Err(MacroCalError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_durations() {
        let mut config = Config::default();
        config.fomc.duration_minutes = -5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.reminder_minutes = vec![30, -1];
        assert!(config.validate().is_err());
    }
}

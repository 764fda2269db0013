//! BEA release dates feed (GDP and Personal Income and Outlays).
//!
//! The feed maps release names to an object holding a list of ISO-8601
//! timestamps with explicit UTC offsets:
//!
//! ```json
//! { "Gross Domestic Product": { "release_dates": ["2026-01-29T08:30:00-05:00"] } }
//! ```

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{DIAGNOSTIC_SAMPLE, Fetch, normalize_label, sorted_unique};
use crate::config::Config;
use crate::error::{MacroCalError, MacroCalResult};
use crate::release::Release;
use crate::tz;

/// Release instants from the BEA feed, in the target timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaDates {
    pub gdp: Vec<DateTime<Tz>>,
    pub personal_income: Vec<DateTime<Tz>>,
}

/// Fetch and parse the release dates feed.
pub async fn fetch<F: Fetch>(fetcher: &F, config: &Config) -> MacroCalResult<BeaDates> {
    let url = &config.bea.url;
    let document = fetcher.fetch_json(url).await?;
    parse_release_dates(&document, url, config)
}

/// Extract GDP and Personal Income and Outlays instants for `config.year`.
pub fn parse_release_dates(
    document: &Value,
    url: &str,
    config: &Config,
) -> MacroCalResult<BeaDates> {
    let releases = match document.as_object() {
        Some(map) if !map.is_empty() => map,
        Some(_) => {
            return Err(MacroCalError::InvalidDocument {
                url: url.to_string(),
                reason: "top-level object is empty".into(),
            });
        }
        None => {
            return Err(MacroCalError::InvalidDocument {
                url: url.to_string(),
                reason: format!("expected a JSON object, got {}", kind(document)),
            });
        }
    };

    let gdp = release_instants(releases, &config.bea.gdp_key, Release::Gdp, url, config)?;
    let personal_income = release_instants(
        releases,
        &config.bea.personal_income_key,
        Release::PersonalIncomeOutlays,
        url,
        config,
    )?;

    info!(
        gdp = gdp.len(),
        personal_income = personal_income.len(),
        "Parsed BEA release dates"
    );

    Ok(BeaDates {
        gdp,
        personal_income,
    })
}

fn release_instants(
    releases: &Map<String, Value>,
    key: &str,
    release: Release,
    url: &str,
    config: &Config,
) -> MacroCalResult<Vec<DateTime<Tz>>> {
    let (resolved, entry) =
        resolve_key(releases, key).ok_or_else(|| MacroCalError::ReleaseKeyNotFound {
            url: url.to_string(),
            key: key.to_string(),
            available: releases.keys().take(DIAGNOSTIC_SAMPLE).cloned().collect(),
        })?;
    if resolved != key {
        debug!(wanted = key, found = resolved, "Resolved BEA release key loosely");
    }

    let raw = date_strings(entry);
    let mut instants = Vec::new();

    for value in &raw {
        let Some(text) = value.as_str() else {
            debug!(entry = %value, "Skipping non-string BEA date entry");
            continue;
        };
        let Ok(parsed) = DateTime::parse_from_rfc3339(text.trim()) else {
            debug!(entry = text, "Skipping malformed BEA date");
            continue;
        };
        if parsed.year() != config.year {
            continue;
        }
        instants.push(tz::to_target(&parsed, config.target_timezone));
    }

    if instants.is_empty() {
        return Err(MacroCalError::CategoryEmpty {
            url: url.to_string(),
            category: release.to_string(),
            year: config.year,
            sample: raw
                .iter()
                .take(DIAGNOSTIC_SAMPLE)
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect(),
        });
    }

    Ok(sorted_unique(instants))
}

/// Look up a release by exact key, then normalized exact match, then
/// normalized substring.
fn resolve_key<'a>(releases: &'a Map<String, Value>, wanted: &str) -> Option<(&'a str, &'a Value)> {
    let normalized = normalize_label(wanted);

    releases
        .iter()
        .find(|(key, _)| key.as_str() == wanted)
        .or_else(|| {
            releases
                .iter()
                .find(|(key, _)| normalize_label(key) == normalized)
        })
        .or_else(|| {
            releases
                .iter()
                .find(|(key, _)| normalize_label(key).contains(&normalized))
        })
        .map(|(key, value)| (key.as_str(), value))
}

/// The list of timestamps under a release entry.
///
/// Usually `{"release_dates": [...]}`; a bare list or an object whose only
/// list lives under another name are accepted too.
fn date_strings(entry: &Value) -> Vec<Value> {
    match entry {
        Value::Array(items) => items.clone(),
        Value::Object(fields) => fields
            .get("release_dates")
            .and_then(Value::as_array)
            .or_else(|| fields.values().find_map(Value::as_array))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

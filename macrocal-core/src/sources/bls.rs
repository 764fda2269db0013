//! BLS release schedule scraper (CPI and Employment Situation).
//!
//! The schedule page is a single HTML table. Rows pair a release label with
//! a date string, but the column order has changed over the years, so each
//! row is tried date-first and then label-first.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::{DIAGNOSTIC_SAMPLE, Fetch, normalize_label, sorted_unique};
use crate::config::Config;
use crate::error::{MacroCalError, MacroCalResult};
use crate::release::Release;
use crate::tz;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table tbody tr").expect("valid selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("valid selector"));

/// "January 14, 2026", "Jan. 14, 2026", "FRIDAY, JANUARY 9, 2026"
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\.?\s+(\d{1,2}),\s+(\d{4})\b").expect("valid regex")
});

static CPI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bconsumer price index\b|\bcpi\b").expect("valid regex")
});

static EMPLOYMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bemployment situation\b").expect("valid regex"));

/// Release instants scraped from the schedule page, in the target timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDates {
    pub cpi: Vec<DateTime<Tz>>,
    pub employment: Vec<DateTime<Tz>>,
}

/// Fetch and parse the schedule page for `config.year`.
pub async fn fetch<F: Fetch>(fetcher: &F, config: &Config) -> MacroCalResult<ScheduleDates> {
    let url = config.bls.url_for(config.year);
    let html = fetcher.fetch_text(&url).await?;
    parse_schedule(&html, &url, config)
}

/// Extract CPI and Employment Situation dates from schedule HTML.
///
/// Every matched row gets the configured release time in the source zone.
/// Rows without a recognizable date, or dated outside `config.year`, are
/// skipped. Fails if the table is missing or either category ends up empty.
pub fn parse_schedule(html: &str, url: &str, config: &Config) -> MacroCalResult<ScheduleDates> {
    let document = Html::parse_document(html);

    if document.select(&TABLE_SELECTOR).next().is_none() {
        return Err(MacroCalError::TableNotFound { url: url.to_string() });
    }

    let rows: Vec<ElementRef> = document.select(&ROW_SELECTOR).collect();
    if rows.is_empty() {
        return Err(MacroCalError::TableNotFound { url: url.to_string() });
    }

    let mut cpi = Vec::new();
    let mut employment = Vec::new();
    let mut seen_labels: Vec<String> = Vec::new();

    for row in rows {
        let cols: Vec<String> = row
            .select(&CELL_SELECTOR)
            .map(cell_text)
            .filter(|text| !text.is_empty())
            .collect();
        if cols.len() < 2 {
            continue;
        }

        let Some((date, label)) = split_row(&cols) else {
            debug!(row = %cols.join(" | "), "Skipping schedule row without a date");
            remember(&mut seen_labels, &cols[0]);
            continue;
        };
        remember(&mut seen_labels, &label);

        if date.year() != config.year {
            debug!(%date, "Skipping schedule row outside {}", config.year);
            continue;
        }

        let Some(release) = classify(&label) else {
            continue;
        };

        let instant = tz::localize(
            date,
            config.bls.release_time,
            config.source_timezone,
            config.target_timezone,
        )?;

        match release {
            RowMatch::Cpi => cpi.push(instant),
            RowMatch::Employment => employment.push(instant),
            RowMatch::Both => {
                warn!(%label, %date, "Schedule row matches both CPI and Employment Situation");
                cpi.push(instant);
                employment.push(instant);
            }
        }
    }

    let dates = ScheduleDates {
        cpi: sorted_unique(cpi),
        employment: sorted_unique(employment),
    };

    for (release, found) in [
        (Release::Cpi, &dates.cpi),
        (Release::EmploymentSituation, &dates.employment),
    ] {
        if found.is_empty() {
            return Err(MacroCalError::CategoryEmpty {
                url: url.to_string(),
                category: release.to_string(),
                year: config.year,
                sample: seen_labels.into_iter().take(DIAGNOSTIC_SAMPLE).collect(),
            });
        }
    }

    info!(
        cpi = dates.cpi.len(),
        employment = dates.employment.len(),
        "Parsed BLS schedule"
    );

    Ok(dates)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowMatch {
    Cpi,
    Employment,
    Both,
}

/// Classify a release label. Matching is not exclusive; a label hitting
/// both patterns is reported as `Both` and counted for each.
fn classify(label: &str) -> Option<RowMatch> {
    let label = normalize_label(label);
    let cpi = CPI_PATTERN.is_match(&label);
    let employment = is_employment_situation(&label);

    match (cpi, employment) {
        (true, true) => Some(RowMatch::Both),
        (true, false) => Some(RowMatch::Cpi),
        (false, true) => Some(RowMatch::Employment),
        (false, false) => None,
    }
}

/// "The Employment Situation", "Employment Situation for December", but not
/// the annual "Employment Situation of Veterans" style releases.
fn is_employment_situation(normalized: &str) -> bool {
    EMPLOYMENT_PATTERN
        .find_iter(normalized)
        .any(|m| !normalized[m.end()..].starts_with(" of "))
}

/// Find the date in either column order.
///
/// Date-first: column 0 holds the date and the rest is the label. Otherwise
/// the remaining columns hold the date and column 0 is the label.
fn split_row(cols: &[String]) -> Option<(NaiveDate, String)> {
    let rest = cols[1..].join(" ");

    if let Some(date) = find_date(&cols[0]) {
        return Some((date, rest));
    }

    find_date(&rest).map(|date| (date, cols[0].clone()))
}

fn find_date(text: &str) -> Option<NaiveDate> {
    DATE_PATTERN.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn month_number(word: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let word = word.to_lowercase();
    if word.len() < 3 {
        return None;
    }
    let word = if word == "sept" { "sep".to_string() } else { word };

    MONTHS
        .iter()
        .position(|month| month.starts_with(word.as_str()))
        .map(|i| i as u32 + 1)
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn remember(seen: &mut Vec<String>, label: &str) {
    if !seen.iter().any(|s| s == label) {
        seen.push(label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use chrono_tz::Asia::Taipei;

    const URL: &str = "https://www.bls.gov/schedule/2026/home.htm";

    fn page(rows: &str) -> String {
        format!(
            "<html><body><table>\
             <thead><tr><th>Release</th><th>Date</th></tr></thead>\
             <tbody>{rows}</tbody>\
             </table></body></html>"
        )
    }

    #[test]
    fn test_parse_label_first_rows() {
        let html = page(
            "<tr><td>Consumer Price Index for December 2025</td><td>January 13, 2026</td></tr>\
             <tr><td>The Employment Situation for December</td><td>January 9, 2026</td></tr>\
             <tr><td>Producer Price Index</td><td>January 14, 2026</td></tr>",
        );

        let dates = parse_schedule(&html, URL, &Config::default()).unwrap();

        assert_eq!(
            dates.cpi,
            vec![Taipei.with_ymd_and_hms(2026, 1, 13, 21, 30, 0).unwrap()]
        );
        assert_eq!(
            dates.employment,
            vec![Taipei.with_ymd_and_hms(2026, 1, 9, 21, 30, 0).unwrap()]
        );
    }

    #[test]
    fn test_parse_date_first_rows_with_extra_columns() {
        let html = page(
            "<tr><td>Friday, August 7, 2026</td><td>08:30 AM</td><td>Employment Situation for July</td></tr>\
             <tr><td>Wednesday, August 12, 2026</td><td>08:30 AM</td><td>CPI for July 2026</td></tr>",
        );

        let dates = parse_schedule(&html, URL, &Config::default()).unwrap();

        // EDT: 08:30 ET is 20:30 in Taipei
        assert_eq!(dates.cpi.len(), 1);
        assert_eq!(dates.cpi[0].hour(), 20);
        assert_eq!(
            dates.employment,
            vec![Taipei.with_ymd_and_hms(2026, 8, 7, 20, 30, 0).unwrap()]
        );
    }

    #[test]
    fn test_duplicate_rows_are_collapsed() {
        let html = page(
            "<tr><td>Consumer Price Index</td><td>February 11, 2026</td></tr>\
             <tr><td>Consumer Price Index</td><td>January 13, 2026</td></tr>\
             <tr><td>consumer  price   index</td><td>FEBRUARY 11, 2026</td></tr>\
             <tr><td>Employment Situation</td><td>February 6, 2026</td></tr>",
        );

        let dates = parse_schedule(&html, URL, &Config::default()).unwrap();

        assert_eq!(
            dates.cpi,
            vec![
                Taipei.with_ymd_and_hms(2026, 1, 13, 21, 30, 0).unwrap(),
                Taipei.with_ymd_and_hms(2026, 2, 11, 21, 30, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_rows_without_dates_or_columns_are_skipped() {
        let html = page(
            "<tr><td colspan=\"2\">January</td></tr>\
             <tr><td>Consumer Price Index</td><td>To be announced</td></tr>\
             <tr><td>Consumer Price Index</td><td>February 30, 2026</td></tr>\
             <tr><td>Consumer Price Index</td><td>March 11, 2026</td></tr>\
             <tr><td>Employment Situation</td><td>March 6, 2026</td></tr>",
        );

        let dates = parse_schedule(&html, URL, &Config::default()).unwrap();
        assert_eq!(dates.cpi.len(), 1);
        assert_eq!(dates.employment.len(), 1);
    }

    #[test]
    fn test_rows_from_other_years_are_dropped() {
        let html = page(
            "<tr><td>Consumer Price Index</td><td>December 10, 2025</td></tr>\
             <tr><td>Consumer Price Index</td><td>January 13, 2026</td></tr>\
             <tr><td>Employment Situation</td><td>January 9, 2026</td></tr>",
        );

        let dates = parse_schedule(&html, URL, &Config::default()).unwrap();
        assert_eq!(dates.cpi.len(), 1);
    }

    #[test]
    fn test_empty_category_reports_seen_labels() {
        let html = page(
            "<tr><td>Consumer Price Index</td><td>January 13, 2026</td></tr>\
             <tr><td>Real Earnings</td><td>January 13, 2026</td></tr>\
             <tr><td>Job Openings and Labor Turnover Survey</td><td>January 6, 2026</td></tr>",
        );

        let err = parse_schedule(&html, URL, &Config::default()).unwrap_err();

        match &err {
            MacroCalError::CategoryEmpty {
                url,
                category,
                year,
                sample,
            } => {
                assert_eq!(url, URL);
                assert_eq!(category, "Employment Situation");
                assert_eq!(*year, 2026);
                assert!(sample.contains(&"Real Earnings".to_string()));
            }
            other => panic!("expected CategoryEmpty, got {other:?}"),
        }
        assert!(err.to_string().contains("Job Openings and Labor Turnover Survey"));
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let err = parse_schedule("<html><body><p>Access Denied</p></body></html>", URL, &Config::default())
            .unwrap_err();
        assert!(matches!(err, MacroCalError::TableNotFound { .. }));
    }

    #[test]
    fn test_classify_labels() {
        assert_eq!(classify("Consumer Price Index for May 2026"), Some(RowMatch::Cpi));
        assert_eq!(classify("CPI"), Some(RowMatch::Cpi));
        assert_eq!(classify("CPIs and more"), None);
        assert_eq!(classify("The Employment Situation"), Some(RowMatch::Employment));
        assert_eq!(classify("Employment Situation of Veterans"), None);
        assert_eq!(classify("State Employment and Unemployment"), None);
        assert_eq!(
            classify("Employment Situation and CPI combined"),
            Some(RowMatch::Both)
        );
    }

    #[test]
    fn test_find_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2026, 9, 11);
        assert_eq!(find_date("September 11, 2026"), expected);
        assert_eq!(find_date("Sept. 11, 2026"), expected);
        assert_eq!(find_date("Friday, SEP 11, 2026"), expected);
        assert_eq!(find_date("Week 37, 2026"), None);
    }
}

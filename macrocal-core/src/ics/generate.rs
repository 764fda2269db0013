//! ICS calendar generation.

use chrono::{DateTime, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use super::fold::fold_line;
use crate::config::Config;
use crate::event::Event;

/// Calendar-level values written into the document header.
#[derive(Debug, Clone)]
pub struct CalendarMetadata {
    pub product_id: String,
    /// X-WR-CALNAME
    pub calendar_name: String,
    /// Display timezone (X-WR-TIMEZONE and the VTIMEZONE block)
    pub timezone: Tz,
    pub year: i32,
    /// Reminder lead times in minutes, one VALARM each per event
    pub reminders: Vec<i64>,
}

impl CalendarMetadata {
    pub fn from_config(config: &Config) -> Self {
        CalendarMetadata {
            product_id: config.calendar.product_id.clone(),
            calendar_name: config.calendar_name(),
            timezone: config.target_timezone,
            year: config.year,
            reminders: config.reminder_minutes.clone(),
        }
    }
}

/// Render events as one ICS document.
///
/// `stamp` becomes every event's DTSTAMP; it is the only value that differs
/// between two runs over the same inputs. Every content line is folded and
/// terminated with CRLF.
pub fn generate_calendar(
    events: &[Event],
    metadata: &CalendarMetadata,
    stamp: DateTime<Utc>,
) -> String {
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", metadata.product_id),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(&metadata.calendar_name)),
        format!("X-WR-TIMEZONE:{}", metadata.timezone.name()),
    ];

    if let Some(offset) = constant_offset(metadata.timezone, metadata.year) {
        push_vtimezone(&mut lines, metadata.timezone, offset);
    }

    for event in events {
        push_event(&mut lines, event, &dtstamp, &metadata.reminders);
    }

    lines.push("END:VCALENDAR".to_string());

    let mut output = String::new();
    for line in &lines {
        output.push_str(&fold_line(line));
        output.push_str("\r\n");
    }
    output
}

fn push_event(lines: &mut Vec<String>, event: &Event, dtstamp: &str, reminders: &[i64]) {
    let summary = escape_text(&event.name);

    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{}", event.uid()));
    lines.push(format!("DTSTAMP:{dtstamp}"));
    lines.push(format!("SUMMARY:{summary}"));
    lines.push(datetime_property("DTSTART", &event.start));
    lines.push(datetime_property("DTEND", &event.end()));

    if !event.categories.is_empty() {
        let categories: Vec<String> = event.categories.iter().map(|c| escape_text(c)).collect();
        lines.push(format!("CATEGORIES:{}", categories.join(",")));
    }

    if !event.description.is_empty() {
        lines.push(format!("DESCRIPTION:{}", escape_text(&event.description)));
    }

    for minutes in reminders {
        lines.push("BEGIN:VALARM".to_string());
        lines.push("ACTION:DISPLAY".to_string());
        lines.push(format!("DESCRIPTION:提醒：{summary}"));
        lines.push(format!("TRIGGER:-PT{minutes}M"));
        lines.push("END:VALARM".to_string());
    }

    lines.push("END:VEVENT".to_string());
}

/// Local wall-clock time with an explicit TZID parameter
fn datetime_property(name: &str, dt: &DateTime<Tz>) -> String {
    format!(
        "{};TZID={}:{}",
        name,
        dt.timezone().name(),
        dt.format("%Y%m%dT%H%M%S")
    )
}

/// The zone's UTC offset in seconds if it stays fixed throughout `year`.
///
/// Zones with DST would need full transition rules, which this calendar
/// never needs; for them no VTIMEZONE is written.
fn constant_offset(tz: Tz, year: i32) -> Option<i32> {
    let mut offsets = (1..=12)
        .filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1))
        .filter_map(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| tz.offset_from_utc_datetime(&naive).fix().local_minus_utc());

    let first = offsets.next()?;
    offsets.all(|o| o == first).then_some(first)
}

fn push_vtimezone(lines: &mut Vec<String>, tz: Tz, offset_seconds: i32) {
    let offset = format_utc_offset(offset_seconds);

    lines.push("BEGIN:VTIMEZONE".to_string());
    lines.push(format!("TZID:{}", tz.name()));
    lines.push("BEGIN:STANDARD".to_string());
    lines.push("DTSTART:19700101T000000".to_string());
    lines.push(format!("TZOFFSETFROM:{offset}"));
    lines.push(format!("TZOFFSETTO:{offset}"));
    lines.push("END:STANDARD".to_string());
    lines.push("END:VTIMEZONE".to_string());
}

/// +0800 / -0330
fn format_utc_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}{:02}", sign, minutes / 60, minutes % 60)
}

/// Escape a TEXT value: backslash, semicolon, comma and newlines.
fn escape_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(normalized.len());
    for ch in normalized.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

//! End-to-end calendar build: sources, event mapping, serialization.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::config::Config;
use crate::error::MacroCalResult;
use crate::event::Event;
use crate::ics::{CalendarMetadata, generate_calendar};
use crate::release::Release;
use crate::sources::{Fetch, bea, bls, fomc};

/// A rendered calendar document and how many events it holds.
#[derive(Debug, Clone)]
pub struct GeneratedCalendar {
    pub content: String,
    pub event_count: usize,
}

/// Collect every release for `config.year` as events sorted by start.
///
/// Sources run one after another; the first failure aborts the run so a
/// partial calendar is never produced.
pub async fn build_events<F: Fetch>(config: &Config, fetcher: &F) -> MacroCalResult<Vec<Event>> {
    let mut events = Vec::new();

    let schedule = bls::fetch(fetcher, config).await?;
    push_events(&mut events, Release::Cpi, &schedule.cpi, config);
    push_events(&mut events, Release::EmploymentSituation, &schedule.employment, config);

    let decisions = fomc::decision_instants(config)?;
    push_events(&mut events, Release::FomcDecision, &decisions, config);

    let feed = bea::fetch(fetcher, config).await?;
    push_events(&mut events, Release::Gdp, &feed.gdp, config);
    push_events(&mut events, Release::PersonalIncomeOutlays, &feed.personal_income, config);

    // Stable, so same-instant releases keep source order
    events.sort_by_key(|event| event.start);

    info!(count = events.len(), year = config.year, "Collected release events");

    Ok(events)
}

/// Serialize events with the header values from `config`.
pub fn render_calendar(config: &Config, events: &[Event], stamp: DateTime<Utc>) -> String {
    generate_calendar(events, &CalendarMetadata::from_config(config), stamp)
}

/// Build and serialize the whole calendar.
pub async fn generate<F: Fetch>(
    config: &Config,
    fetcher: &F,
    stamp: DateTime<Utc>,
) -> MacroCalResult<GeneratedCalendar> {
    let events = build_events(config, fetcher).await?;

    Ok(GeneratedCalendar {
        content: render_calendar(config, &events, stamp),
        event_count: events.len(),
    })
}

fn push_events(events: &mut Vec<Event>, release: Release, instants: &[DateTime<Tz>], config: &Config) {
    events.extend(instants.iter().map(|start| release.event(*start, config)));
}

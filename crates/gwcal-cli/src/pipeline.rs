//! Calendar pipeline: fetch → extract → geocode each event → write snapshot.
//!
//! Events are geocoded one at a time by a single owner of the [`Geocoder`];
//! event *i + 1* is not started until event *i* is finished. Per-event
//! geocode failures are logged and the event is kept without coordinates.
//! Only a failed page fetch or a failed snapshot write aborts the run.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use gwcal_core::{AppConfig, Coordinates, Dataset, EnrichedEvent, RawEvent};
use gwcal_scraper::{
    extract_events, CalendarClient, GeocodeCache, Geocoder, GeocoderSettings, RetryPolicy,
};

use crate::dataset::write_dataset;

/// What happened to one event during enrichment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EventOutcome {
    /// No location text, the geocoder was not called.
    Skipped,
    Geocoded(Coordinates),
    /// The service answered with no candidates.
    NoMatch,
    /// Retries exhausted or the response was unusable.
    Failed,
}

impl EventOutcome {
    fn coordinates(self) -> Option<Coordinates> {
        match self {
            EventOutcome::Geocoded(c) => Some(c),
            _ => None,
        }
    }
}

/// Per-outcome tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub total: usize,
    pub geocoded: usize,
    pub no_match: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: EventOutcome) {
        match outcome {
            EventOutcome::Skipped => self.skipped += 1,
            EventOutcome::Geocoded(_) => self.geocoded += 1,
            EventOutcome::NoMatch => self.no_match += 1,
            EventOutcome::Failed => self.failed += 1,
        }
    }
}

/// Runs the full pipeline and writes the snapshot to `config.output_path`.
///
/// # Errors
///
/// Returns an error if the calendar page cannot be fetched, the geocoder
/// cannot be configured, or the snapshot cannot be written. Geocoding
/// failures for individual events are not errors.
pub(crate) async fn run_pipeline(config: &AppConfig) -> anyhow::Result<RunSummary> {
    let started_at = Utc::now();

    let events = fetch_events(config).await?;
    tracing::info!("Found {} events, geocoding...", events.len());

    let cache = GeocodeCache::new(&config.cache_dir);
    if let Err(err) = cache.ensure_dir().await {
        tracing::debug!(dir = %config.cache_dir.display(), error = %err, "could not create geocode cache dir");
    }
    let mut geocoder = Geocoder::new(geocoder_settings(config), cache)
        .context("failed to configure geocoder")?;

    let (enriched, summary) = enrich_events(&mut geocoder, events).await;

    let dataset = Dataset::new(started_at, enriched);
    write_dataset(&config.output_path, &dataset)
        .await
        .with_context(|| {
            format!(
                "failed to write dataset to {}",
                config.output_path.display()
            )
        })?;

    let stats = geocoder.stats();
    tracing::info!(
        path = %config.output_path.display(),
        total = summary.total,
        geocoded = summary.geocoded,
        no_match = summary.no_match,
        failed = summary.failed,
        skipped = summary.skipped,
        cache_hits = stats.cache_hits,
        remote_lookups = stats.remote_lookups,
        "Wrote {}",
        config.output_path.display()
    );

    Ok(summary)
}

/// Fetches and extracts, then prints the raw events as JSON to stdout.
///
/// # Errors
///
/// Returns an error if the calendar page cannot be fetched.
pub(crate) async fn run_dry(config: &AppConfig) -> anyhow::Result<()> {
    let events = fetch_events(config).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&events).context("failed to serialize events")?
    );
    tracing::info!(
        events = events.len(),
        "dry-run: skipped geocoding and did not write {}",
        config.output_path.display()
    );
    Ok(())
}

async fn fetch_events(config: &AppConfig) -> anyhow::Result<Vec<RawEvent>> {
    tracing::info!(url = %config.source_url, "Fetching calendar...");
    let client = CalendarClient::new(config.request_timeout_secs, &config.user_agent)?;
    let html = client
        .fetch_page(&config.source_url)
        .await
        .with_context(|| format!("failed to fetch calendar page {}", config.source_url))?;
    Ok(extract_events(&html))
}

fn geocoder_settings(config: &AppConfig) -> GeocoderSettings {
    GeocoderSettings {
        endpoint: config.geocoder_url.clone(),
        user_agent: config.user_agent.clone(),
        timeout_secs: config.request_timeout_secs,
        retry: RetryPolicy::new(config.geocode_max_attempts, config.geocode_backoff_base_ms),
        pacing: Duration::from_millis(config.geocode_delay_ms),
    }
}

/// Geocodes `events` in order and returns them enriched, in the same order.
pub(crate) async fn enrich_events(
    geocoder: &mut Geocoder,
    events: Vec<RawEvent>,
) -> (Vec<EnrichedEvent>, RunSummary) {
    let total = events.len();
    let mut summary = RunSummary {
        total,
        ..RunSummary::default()
    };
    let mut enriched = Vec::with_capacity(total);

    for (index, event) in events.into_iter().enumerate() {
        let outcome = geocode_event(geocoder, &event, index + 1, total).await;
        summary.record(outcome);
        enriched.push(EnrichedEvent::new(event, outcome.coordinates()));
    }

    (enriched, summary)
}

async fn geocode_event(
    geocoder: &mut Geocoder,
    event: &RawEvent,
    position: usize,
    total: usize,
) -> EventOutcome {
    if event.location_text.is_empty() {
        tracing::info!(
            "[{position}/{total}] Skipping geocode (no location): {}",
            event.name
        );
        return EventOutcome::Skipped;
    }

    tracing::info!(
        "[{position}/{total}] Geocoding: {} ({})",
        event.location_text,
        event.name
    );

    match geocoder.resolve(&event.location_text).await {
        Ok(Some(coordinates)) => EventOutcome::Geocoded(coordinates),
        Ok(None) => {
            tracing::info!(
                location = %event.location_text,
                event = %event.name,
                "[{position}/{total}] No geocode match"
            );
            EventOutcome::NoMatch
        }
        Err(err) => {
            tracing::warn!(
                location = %event.location_text,
                event = %event.name,
                error = %err,
                "[{position}/{total}] Geocode failed for {}",
                event.location_text
            );
            EventOutcome::Failed
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

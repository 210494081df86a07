//! Location-text geocoding against a free-text search service.
//!
//! [`Geocoder::resolve`] consults the [`GeocodeCache`] first and only goes to
//! the network on a miss. Remote lookups are retried according to the
//! configured [`RetryPolicy`] and paced so that consecutive calls are at
//! least `pacing` apart. The geocoder is driven through `&mut self`, so a
//! single caller owns it and lookups can never overlap.

mod cache;
mod response;

use std::time::Duration;

use gwcal_core::Coordinates;
use reqwest::{Client, Url};
use tokio::time::Instant;

pub use cache::{CacheEntry, GeocodeCache};

use crate::error::ScraperError;
use crate::retry::RetryPolicy;

/// Connection and pacing parameters for a [`Geocoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderSettings {
    /// Search endpoint, e.g. `https://nominatim.openstreetmap.org/search`.
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
    /// Minimum gap between two remote lookups. Cache hits are not paced.
    pub pacing: Duration,
}

impl GeocoderSettings {
    /// Settings with a 15 s timeout, the default retry policy and no pacing.
    #[must_use]
    pub fn new(endpoint: &str, user_agent: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            user_agent: user_agent.to_owned(),
            timeout_secs: 15,
            retry: RetryPolicy::default(),
            pacing: Duration::ZERO,
        }
    }
}

/// Counters for the lookups a geocoder has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeStats {
    pub cache_hits: u32,
    pub remote_lookups: u32,
}

pub struct Geocoder {
    client: Client,
    settings: GeocoderSettings,
    cache: GeocodeCache,
    last_remote_at: Option<Instant>,
    stats: GeocodeStats,
}

impl Geocoder {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built, or
    /// [`ScraperError::InvalidUrl`] if the endpoint does not parse.
    pub fn new(settings: GeocoderSettings, cache: GeocodeCache) -> Result<Self, ScraperError> {
        parse_endpoint(&settings.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            settings,
            cache,
            last_remote_at: None,
            stats: GeocodeStats::default(),
        })
    }

    #[must_use]
    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    #[must_use]
    pub fn stats(&self) -> GeocodeStats {
        self.stats
    }

    /// Resolves `query` to the first candidate's coordinates.
    ///
    /// An empty query returns `Ok(None)` without touching the cache or the
    /// network. A response with no candidates is cached and also yields
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the last [`ScraperError`] once the retry policy is exhausted,
    /// or [`ScraperError::Deserialize`] if the service answered with
    /// something other than JSON. Neither outcome is cached.
    pub async fn resolve(&mut self, query: &str) -> Result<Option<Coordinates>, ScraperError> {
        if query.is_empty() {
            return Ok(None);
        }

        if let Some(body) = self.cache.lookup(query).await {
            self.stats.cache_hits += 1;
            tracing::debug!(query, "geocode cache hit");
            let value = response::parse_body(&body, query)?;
            return Ok(response::first_candidate(&value));
        }

        tracing::debug!(query, "geocode cache miss");
        let url = self.search_url(query)?;

        self.wait_for_pacing().await;
        self.stats.remote_lookups += 1;
        let client = &self.client;
        let result = self
            .settings
            .retry
            .run("geocode", || fetch_once(client, &url))
            .await;
        self.last_remote_at = Some(Instant::now());

        let body = result?;
        let value = response::parse_body(&body, query)?;

        if let Err(err) = self.cache.store(query, &body).await {
            tracing::debug!(query, error = %err, "geocode cache write failed");
        }

        Ok(response::first_candidate(&value))
    }

    /// Endpoint plus `format=json&limit=1&q=<query>`, encoded once.
    fn search_url(&self, query: &str) -> Result<Url, ScraperError> {
        let mut url = parse_endpoint(&self.settings.endpoint)?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("q", query);
        Ok(url)
    }

    async fn wait_for_pacing(&self) {
        let pacing = self.settings.pacing;
        if pacing.is_zero() {
            return;
        }
        if let Some(last) = self.last_remote_at {
            let elapsed = last.elapsed();
            if elapsed < pacing {
                tokio::time::sleep(pacing - elapsed).await;
            }
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ScraperError> {
    Url::parse(endpoint).map_err(|e| ScraperError::InvalidUrl {
        url: endpoint.to_owned(),
        reason: e.to_string(),
    })
}

async fn fetch_once(client: &Client, url: &Url) -> Result<String, ScraperError> {
    let response = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.text().await?)
}

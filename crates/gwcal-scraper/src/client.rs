//! HTTP client for the calendar page.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;

/// Fetches the calendar markup with a single GET.
///
/// There is no retry here: without the page nothing downstream can run, so
/// the caller treats any error as fatal.
pub struct CalendarClient {
    client: Client,
}

impl CalendarClient {
    /// Creates a `CalendarClient` with the given timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Downloads `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] — `url` does not parse.
    /// - [`ScraperError::UnexpectedStatus`] — any non-2xx status.
    /// - [`ScraperError::Http`] — transport failure or timeout.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        tracing::debug!(url, bytes = body.len(), "fetched calendar page");
        Ok(body)
    }
}

//! HTTP client for the discovery service.
//!
//! Wraps `reqwest` with the service's two operations. A transport failure is
//! a [`DiscoveryError`]; a 2xx reply that does not match the expected shape
//! is NOT — the raw text is preserved as the summary (search) or degrades to
//! an unknown status (health check), because the upstream model is free to
//! answer in prose.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};

use hopmap_core::{AliveStatus, Venue};

use crate::coerce::candidate_to_venue;
use crate::error::DiscoveryError;
use crate::retry::retry_with_backoff;
use crate::types::{DiscoveryReply, HealthReport, RawHealthReply, RawSearchReply};

/// Client for the discovery service.
///
/// Use [`DiscoveryClient::new`] with the configured base URL; tests point it
/// at a wiremock server the same way.
pub struct DiscoveryClient {
    client: Client,
    search_url: Url,
    health_url: Url,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DiscoveryClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DiscoveryError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so join() appends to the
        // path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let invalid = |reason: String| DiscoveryError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason,
        };
        let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        let search_url = base.join("search").map_err(|e| invalid(e.to_string()))?;
        let health_url = base
            .join("health-check")
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            search_url,
            health_url,
            api_key: api_key.map(str::to_owned),
            max_retries: 0,
            backoff_base_ms: 500,
        })
    }

    /// Sets the retry policy for transient failures. The default is no
    /// retries.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Asks the service for venues matching a natural-language query,
    /// optionally biased around an origin `(latitude, longitude)`.
    ///
    /// Candidates in the reply are untrusted and pass through coordinate
    /// validation and category normalization before they come out as typed
    /// [`Venue`]s; candidates that fail are dropped with a debug log.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] on network failure or a non-2xx
    /// status (after retries).
    pub async fn search(
        &self,
        query: &str,
        origin: Option<(f64, f64)>,
    ) -> Result<DiscoveryReply, DiscoveryError> {
        let mut body = serde_json::json!({ "query": query });
        if let Some((lat, lng)) = origin {
            body["origin"] = serde_json::json!({ "lat": lat, "lng": lng });
        }

        let text = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_text(&self.search_url, &body)
        })
        .await?;

        Ok(parse_search_reply(&text))
    }

    /// Asks the service whether a venue is still operating.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] on network failure or a non-2xx
    /// status (after retries).
    pub async fn check_health(&self, venue_name: &str) -> Result<HealthReport, DiscoveryError> {
        let body = serde_json::json!({ "name": venue_name });

        let text = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_text(&self.health_url, &body)
        })
        .await?;

        Ok(parse_health_reply(&text))
    }

    /// Sends a POST with a JSON body, asserts a 2xx status, and returns the
    /// raw response text.
    async fn post_text(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> Result<String, DiscoveryError> {
        let mut request = self.client.post(url.clone()).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Parses a search reply body. An unparseable body yields an empty candidate
/// list with the raw text preserved as the summary.
fn parse_search_reply(text: &str) -> DiscoveryReply {
    let Ok(raw) = serde_json::from_str::<RawSearchReply>(text) else {
        tracing::debug!("search reply did not match the expected shape; keeping raw text");
        return DiscoveryReply {
            summary: text.to_string(),
            candidates: Vec::new(),
            sources: Vec::new(),
        };
    };

    let offered = raw.breweries.len();
    let candidates: Vec<Venue> = raw.breweries.iter().filter_map(candidate_to_venue).collect();
    if candidates.len() < offered {
        tracing::debug!(
            offered,
            kept = candidates.len(),
            "dropped discovery candidates that failed validation"
        );
    }

    DiscoveryReply {
        summary: raw.message,
        candidates,
        sources: raw.sources,
    }
}

/// Parses a health-check reply body. An unparseable body degrades to
/// [`AliveStatus::Unknown`]. `checked_at` is stamped here, at completion.
fn parse_health_reply(text: &str) -> HealthReport {
    let (status, reason) = match serde_json::from_str::<RawHealthReply>(text) {
        Ok(raw) => (AliveStatus::from_label(&raw.status), raw.reason),
        Err(_) => {
            tracing::debug!("health reply did not match the expected shape; treating as unknown");
            (AliveStatus::Unknown, None)
        }
    };

    HealthReport {
        status,
        reason,
        checked_at: Utc::now(),
    }
}

//! Events search adapter for a SerpAPI-style Google Events endpoint.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::event::CandidateEvent;
use crate::plan::SearchParams;
use crate::source::EventsSource;

const DEFAULT_BASE_URL: &str = "https://serpapi.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// HTTP adapter for the events search provider.
pub struct EventSearchApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl EventSearchApi {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build events API client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl EventsSource for EventSearchApi {
    async fn search(&self, params: &SearchParams) -> Result<Vec<CandidateEvent>> {
        // Keep the query simple; filtering by budget and preferences happens
        // downstream, and complex queries make the provider return nothing.
        let query = format!("Events in {}, {}", params.city, params.state);
        tracing::debug!(query, "searching events");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google_events"),
                ("q", query.as_str()),
                ("hl", "en"),
                ("gl", "us"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("events API request failed")?;

        let body: serde_json::Value = response
            .json()
            .await
            .context("events API returned non-JSON body")?;

        if let Some(err) = body.get("error").and_then(|e| e.as_str()) {
            bail!("events API error: {err}");
        }

        let events = parse_events_results(&body);
        tracing::info!(count = events.len(), city = %params.city, "events search returned");
        Ok(events)
    }
}

/// Extract candidate events from the provider payload, skipping records that
/// do not coerce. A missing `events_results` key is an empty result.
fn parse_events_results(body: &serde_json::Value) -> Vec<CandidateEvent> {
    let Some(results) = body.get("events_results").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    results
        .iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparsable event record");
                None
            }
        })
        .collect()
}

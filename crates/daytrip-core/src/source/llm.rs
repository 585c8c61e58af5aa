//! Generation adapter for a generative-language `generateContent` endpoint.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::source::GenerationSource;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP adapter for the plan-generation model.
pub struct GenerativeLanguageApi {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GenerativeLanguageApi {
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build generation API client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl GenerationSource for GenerativeLanguageApi {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let request_body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"responseMimeType": "application/json"}
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .context("generation API request failed")?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .context("generation API returned non-JSON body")?;

        if !status.is_success() {
            bail!("generation API returned {status}: {body}");
        }

        match extract_candidate_text(&body) {
            Some(text) => Ok(text.to_string()),
            None => bail!("generation response carries no candidate text"),
        }
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
fn extract_candidate_text(body: &serde_json::Value) -> Option<&str> {
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let body = serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "[{\"title\": \"x\"}]"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(extract_candidate_text(&body), Some("[{\"title\": \"x\"}]"));
    }

    #[test]
    fn missing_candidates_yield_none() {
        assert_eq!(extract_candidate_text(&serde_json::json!({})), None);
        assert_eq!(
            extract_candidate_text(&serde_json::json!({"candidates": []})),
            None
        );
        assert_eq!(
            extract_candidate_text(&serde_json::json!({
                "candidates": [{"content": {"parts": []}}]
            })),
            None
        );
    }
}

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::models::{FeedEnvelope, Match};
use super::provider::MatchFeed;

/// Failure of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not complete or came back with a non-success status
    #[error("transport error: {0}")]
    Transport(String),
    /// The body was not JSON or did not have the expected shape
    #[error("malformed feed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Message suitable for showing in place of (or above) the match list.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "Error: failed to load match information",
            FetchError::Malformed(_) => "Error: the match feed returned an unexpected response",
        }
    }
}

/// HTTP client for the match feed endpoint.
pub struct FeedClient {
    http: Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FeedClient {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl MatchFeed for FeedClient {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch_matches(&self) -> Result<Vec<Match>, FetchError> {
        debug!("Fetching matches from {}", self.url);

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Transport(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        parse_feed_body(&body)
    }
}

/// Decode a feed response body into its match list.
///
/// Required fields missing, wrong types, or negative counters all surface as
/// `FetchError::Malformed`; optional fields fall back to their defaults.
pub fn parse_feed_body(body: &str) -> Result<Vec<Match>, FetchError> {
    let envelope: FeedEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(envelope.data.matches)
}

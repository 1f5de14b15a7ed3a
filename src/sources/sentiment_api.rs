use crate::error::FetchError;
use crate::sources::{OracleScore, SentimentSnapshot, SentimentSource};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Body of `GET /current`. Before the service has scored any text it answers
/// `{"oracle_score": 50, "status": "no_data"}`, so everything but the score is optional.
#[derive(Debug, Deserialize)]
struct CurrentSentimentResponse {
    oracle_score: i64,
    #[serde(default)]
    community_vibe_score: f64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    text_preview: String,
    #[serde(default)]
    timestamp: Option<String>,
}

pub struct SentimentApiSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl SentimentApiSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Http)?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_request_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Http(err)
        }
    }
}

#[async_trait::async_trait]
impl SentimentSource for SentimentApiSource {
    async fn fetch(&self) -> Result<SentimentSnapshot, FetchError> {
        debug!(url = %self.url, "Fetching current sentiment");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e))?;

        parse_snapshot(&body, Utc::now())
    }
}

/// Decodes a feed body. `fetched_at` stands in for a missing or unreadable timestamp.
pub fn parse_snapshot(body: &[u8], fetched_at: DateTime<Utc>) -> Result<SentimentSnapshot, FetchError> {
    let response: CurrentSentimentResponse = serde_json::from_slice(body)?;
    let score = OracleScore::try_from(response.oracle_score)?;

    let observed_at = response
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(fetched_at);

    Ok(SentimentSnapshot {
        score,
        community_vibe: response.community_vibe_score,
        username: response.username,
        text_preview: response.text_preview,
        observed_at,
    })
}

// The service emits naive ISO-8601 local time; treat it as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

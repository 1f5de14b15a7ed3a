pub mod sentiment_api;

use crate::error::FetchError;
use chrono::{DateTime, Utc};

pub use sentiment_api::SentimentApiSource;

/// Oracle score validated to lie in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OracleScore(u8);

impl OracleScore {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for OracleScore {
    type Error = FetchError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(FetchError::ScoreOutOfRange(raw))
        }
    }
}

/// Latest aggregate read from the sentiment service. Consumed once per relay cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSnapshot {
    pub score: OracleScore,
    pub community_vibe: f64,
    pub username: String,
    pub text_preview: String,
    pub observed_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait SentimentSource: Send + Sync {
    /// Reads the current snapshot. Implementations must not retry internally.
    async fn fetch(&self) -> Result<SentimentSnapshot, FetchError>;
}

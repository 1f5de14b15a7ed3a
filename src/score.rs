//! Maps the off-chain oracle score onto the contract's signed range.

use crate::sources::{OracleScore, SentimentSnapshot};

pub const SIGNED_SCORE_MIN: i64 = -100;
pub const SIGNED_SCORE_MAX: i64 = 100;

/// `[0, 100]` -> `[-100, 100]` via `2 * score - 100`.
pub fn signed_score(score: OracleScore) -> i64 {
    2 * i64::from(score.value()) - 100
}

pub fn transform(snapshot: &SentimentSnapshot) -> i64 {
    signed_score(snapshot.score)
}

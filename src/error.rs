use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Stage of a relay cycle. A failure in any stage returns the loop to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    Waiting,
    Polling,
    Transforming,
    Building,
    Signing,
    Submitting,
}

impl fmt::Display for RelayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayStage::Waiting => "waiting",
            RelayStage::Polling => "polling",
            RelayStage::Transforming => "transforming",
            RelayStage::Building => "building",
            RelayStage::Signing => "signing",
            RelayStage::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("feed request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("oracle score {0} is outside [0, 100]")]
    ScoreOutOfRange(i64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("RPC call timed out after {0:?}")]
    Timeout(Duration),

    #[error("node rejected the request ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("RPC transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to encode contract call: {0}")]
    Encoding(String),

    #[error("failed to query {query}: {source}")]
    NetworkQuery {
        query: &'static str,
        #[source]
        source: RpcError,
    },
}

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("failed to sign transaction: {0}")]
    Signature(#[from] alloy::signers::Error),

    #[error("signer is bound to chain {bound}, refusing to sign for chain {requested}")]
    ChainMismatch { bound: u64, requested: u64 },
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("node rejected transaction ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("failed to send transaction: {0}")]
    Network(RpcError),
}

impl From<RpcError> for SubmissionError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rejected { code, message } => SubmissionError::Rejected { code, message },
            other => SubmissionError::Network(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure of a single relay cycle, tagged with the stage it happened in.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] FetchError),

    #[error("build failed: {0}")]
    Build(#[source] BuildError),

    #[error("signing failed: {0}")]
    Sign(#[source] SigningError),

    #[error("submission failed: {0}")]
    Submit(#[source] SubmissionError),
}

impl CycleError {
    pub fn stage(&self) -> RelayStage {
        match self {
            CycleError::Fetch(_) => RelayStage::Polling,
            CycleError::Build(_) => RelayStage::Building,
            CycleError::Sign(_) => RelayStage::Signing,
            CycleError::Submit(_) => RelayStage::Submitting,
        }
    }

    /// Fatal errors stop the relay loop; everything else forfeits the cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CycleError::Build(BuildError::Encoding(_)) | CycleError::Sign(_)
        )
    }
}

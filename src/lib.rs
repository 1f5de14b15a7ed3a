pub mod blockchain;
pub mod config;
pub mod contracts;
pub mod error;
pub mod jobs;
pub mod retry;
pub mod score;
pub mod signer;
pub mod sources;
pub mod submitter;
pub mod transaction;

pub use blockchain::{BlockchainClient, ChainRpc};
pub use config::RelayerConfig;
pub use error::{CycleError, RelayStage};
pub use jobs::{CycleReport, RelaySession, RelayService, RelayStats};
pub use retry::{execute_with_retry, RetryConfig};
pub use signer::{SignedTransaction, TransactionSigner};
pub use sources::{OracleScore, SentimentApiSource, SentimentSnapshot, SentimentSource};
pub use transaction::{RelayTarget, TransactionBuilder, TransactionRequest};

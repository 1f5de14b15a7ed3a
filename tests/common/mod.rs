#![allow(dead_code)]

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use chrono::Utc;
use sentiment_relayer::config::RelaySettings;
use sentiment_relayer::error::{FetchError, RpcError};
use sentiment_relayer::{
    ChainRpc, OracleScore, RelaySession, RelayTarget, SentimentSnapshot, SentimentSource,
    TransactionSigner,
};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Anvil's first dev account
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const TEST_CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const TEST_CHAIN_ID: u64 = 31337;
pub const TEST_GAS_PRICE: u128 = 1_000_000_000;

pub fn snapshot(score: i64, text: &str) -> SentimentSnapshot {
    SentimentSnapshot {
        score: OracleScore::try_from(score).unwrap(),
        community_vibe: 0.5,
        username: "alice".to_string(),
        text_preview: text.to_string(),
        observed_at: Utc::now(),
    }
}

/// Feed double: serves a fixed snapshot, or a 503 while `fail` is set.
pub struct MockSource {
    snapshot: SentimentSnapshot,
    fail: AtomicBool,
    timeout: AtomicBool,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(snapshot: SentimentSnapshot) -> Self {
        Self {
            snapshot,
            fail: AtomicBool::new(false),
            timeout: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let source = Self::new(snapshot(50, ""));
        source.fail.store(true, Ordering::SeqCst);
        source
    }

    pub fn timing_out() -> Self {
        let source = Self::new(snapshot(50, ""));
        source.timeout.store(true, Ordering::SeqCst);
        source
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentSource for MockSource {
    async fn fetch(&self) -> Result<SentimentSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.timeout.load(Ordering::SeqCst) {
            return Err(FetchError::Timeout(Duration::from_secs(5)));
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status(503));
        }
        Ok(self.snapshot.clone())
    }
}

/// Feed double whose fetch takes `delay`. Tracks how many fetches overlap.
pub struct SlowSource {
    snapshot: SentimentSnapshot,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowSource {
    pub fn new(snapshot: SentimentSnapshot, delay: Duration) -> Self {
        Self {
            snapshot,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentSource for SlowSource {
    async fn fetch(&self) -> Result<SentimentSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

/// Node double. The pending nonce only advances when a transaction is accepted.
pub struct MockChain {
    chain_id: u64,
    next_nonce: Mutex<u64>,
    reject_sends: AtomicBool,
    fail_nonce_queries: AtomicBool,
    calls: AtomicUsize,
    sent: Mutex<Vec<Bytes>>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            next_nonce: Mutex::new(0),
            reject_sends: AtomicBool::new(false),
            fail_nonce_queries: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reject_sends(&self, reject: bool) {
        self.reject_sends.store(reject, Ordering::SeqCst);
    }

    pub fn set_fail_nonce_queries(&self, fail: bool) {
        self.fail_nonce_queries.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_transactions(&self) -> Vec<TxEnvelope> {
        self.sent()
            .iter()
            .map(|raw| TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap())
            .collect()
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain_id)
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_nonce_queries.load(Ordering::SeqCst) {
            return Err(RpcError::Timeout(Duration::from_secs(10)));
        }
        Ok(*self.next_nonce.lock().unwrap())
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TEST_GAS_PRICE)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_sends.load(Ordering::SeqCst) {
            return Err(RpcError::Rejected {
                code: -32000,
                message: "insufficient funds for gas * price + value".to_string(),
            });
        }
        let hash = keccak256(&raw);
        self.sent.lock().unwrap().push(raw);
        *self.next_nonce.lock().unwrap() += 1;
        Ok(hash)
    }
}

pub fn test_target() -> RelayTarget {
    RelayTarget::new(Address::from_str(TEST_CONTRACT).unwrap(), TEST_CHAIN_ID)
}

pub fn test_session(source: Arc<dyn SentimentSource>, chain: Arc<MockChain>) -> RelaySession {
    let signer = TransactionSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
    test_session_with_signer(source, chain, signer)
}

pub fn test_session_with_signer(
    source: Arc<dyn SentimentSource>,
    chain: Arc<MockChain>,
    signer: TransactionSigner,
) -> RelaySession {
    RelaySession::new(source, chain, signer, test_target(), &RelaySettings::default())
}

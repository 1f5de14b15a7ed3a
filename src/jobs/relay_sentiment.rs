use crate::blockchain::{BlockchainClient, ChainRpc};
use crate::config::{RelaySettings, RelayerConfig};
use crate::contracts::{VibeOracleContract, RELAYER_USERNAME};
use crate::error::{CycleError, RelayStage};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::score;
use crate::signer::TransactionSigner;
use crate::sources::{OracleScore, SentimentApiSource, SentimentSource};
use crate::submitter::Submitter;
use crate::transaction::{RelayTarget, TransactionBuilder};
use alloy::primitives::{Address, B256};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of one successful relay cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub oracle_score: OracleScore,
    pub signed_score: i64,
    pub sequence_number: u64,
    pub transaction_hash: B256,
    /// `false` when the cycle ran in dry-run mode and nothing reached the node.
    pub submitted: bool,
}

/// Process-wide relay state: feed and chain handles, the signing key and the
/// target contract. Built once at startup and read-only afterwards.
pub struct RelaySession {
    source: Arc<dyn SentimentSource>,
    rpc: Arc<dyn ChainRpc>,
    signer: TransactionSigner,
    target: RelayTarget,
    builder: TransactionBuilder,
    submitter: Submitter,
    interval: Duration,
    dry_run: bool,
}

impl RelaySession {
    pub fn new(
        source: Arc<dyn SentimentSource>,
        rpc: Arc<dyn ChainRpc>,
        signer: TransactionSigner,
        target: RelayTarget,
        settings: &RelaySettings,
    ) -> Self {
        Self {
            builder: TransactionBuilder::new(rpc.clone(), settings.gas_limit),
            submitter: Submitter::new(rpc.clone()),
            source,
            rpc,
            signer,
            target,
            interval: settings.interval(),
            dry_run: settings.dry_run,
        }
    }

    /// Performs every fatal startup check: key material, contract interface,
    /// node connectivity and chain id.
    pub async fn connect(config: &RelayerConfig) -> Result<Self> {
        let signer = TransactionSigner::from_private_key(&config.signer.private_key)
            .context("Invalid PRIVATE_KEY")?;
        info!("📝 Relayer address: {}", signer.address());

        VibeOracleContract::verify_interface().context("Contract interface check failed")?;
        let contract_address = config.contract_address()?;

        let client = BlockchainClient::new(&config.chain.rpc_url, config.rpc_timeout())?;
        let retry_config = RetryConfig::from(config.retry.clone());
        let chain_id = execute_with_retry(
            || {
                let client = client.clone();
                async move { client.chain_id().await }
            },
            &retry_config,
            "Chain id lookup",
        )
        .await
        .context("Failed to connect to the blockchain node")?;

        if let Some(expected) = config.chain.chain_id {
            if expected != chain_id {
                return Err(anyhow::anyhow!(
                    "Chain ID mismatch: expected {}, got {}",
                    expected,
                    chain_id
                ));
            }
        }
        info!("⛓️  Chain ID: {}", chain_id);
        let signer = signer.with_chain_id(chain_id);
        info!("📄 Contract address: {}", contract_address);

        let source = SentimentApiSource::new(config.feed.api_url.clone(), config.feed_timeout())?;
        info!("📡 Sentiment feed: {}", source.url());

        Ok(Self::new(
            Arc::new(source),
            Arc::new(client),
            signer,
            RelayTarget::new(contract_address, chain_id),
            &config.relay,
        ))
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn target(&self) -> &RelayTarget {
        &self.target
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn rpc(&self) -> Arc<dyn ChainRpc> {
        self.rpc.clone()
    }

    /// One pass POLLING -> TRANSFORMING -> BUILDING -> SIGNING -> SUBMITTING.
    /// Any failure abandons the cycle; nothing is retried here.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        debug!(stage = %RelayStage::Polling, "Entering relay stage");
        let snapshot = self.source.fetch().await.map_err(CycleError::Fetch)?;
        info!(
            "📊 Fetched sentiment: oracle_score={}, vibe={:.4}",
            snapshot.score.value(),
            snapshot.community_vibe
        );

        debug!(stage = %RelayStage::Transforming, "Entering relay stage");
        let signed_score = score::transform(&snapshot);
        info!("🔄 Converting to on-chain format: {} (range: -100 to 100)", signed_score);

        debug!(stage = %RelayStage::Building, "Entering relay stage");
        let request = self
            .builder
            .build(&self.target, signed_score, &snapshot.text_preview, self.signer.address())
            .await
            .map_err(CycleError::Build)?;

        debug!(stage = %RelayStage::Signing, "Entering relay stage");
        let signed_tx = self
            .signer
            .sign(&request, self.target.chain_id)
            .map_err(CycleError::Sign)?;

        if self.dry_run {
            info!(
                nonce = request.sequence_number,
                tx_hash = %signed_tx.transaction_hash,
                "✅ DRY RUN: Would submit submitSentiment('{}', '{}', {})",
                RELAYER_USERNAME,
                snapshot.text_preview,
                signed_score
            );
            return Ok(CycleReport {
                oracle_score: snapshot.score,
                signed_score,
                sequence_number: request.sequence_number,
                transaction_hash: signed_tx.transaction_hash,
                submitted: false,
            });
        }

        debug!(stage = %RelayStage::Submitting, "Entering relay stage");
        info!("📤 Submitting to contract...");
        let transaction_hash = self
            .submitter
            .submit(&signed_tx)
            .await
            .map_err(CycleError::Submit)?;

        info!(nonce = request.sequence_number, "✅ Transaction sent: {}", transaction_hash);
        info!(
            "   Username: '{}', Text: '{}', Score: {}",
            RELAYER_USERNAME, snapshot.text_preview, signed_score
        );

        Ok(CycleReport {
            oracle_score: snapshot.score,
            signed_score,
            sequence_number: request.sequence_number,
            transaction_hash,
            submitted: true,
        })
    }
}

use crate::error::RpcError;
use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::TransportError;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// The four node operations a relay cycle depends on.
#[async_trait::async_trait]
pub trait ChainRpc: Send + Sync {
    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// Next unused sequence number for `address`, counting pending transactions.
    async fn pending_nonce(&self, address: Address) -> Result<u64, RpcError>;

    async fn gas_price(&self) -> Result<u128, RpcError>;

    /// Hands a signed, encoded transaction to the node and returns the hash it accepted.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError>;
}

#[derive(Clone)]
pub struct BlockchainClient {
    provider: Arc<dyn Provider<Ethereum>>,
    timeout: Duration,
}

impl BlockchainClient {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        info!("🔗 Connecting to RPC: {}", rpc_url);

        let url = Url::parse(rpc_url)?;
        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            provider: Arc::new(provider),
            timeout,
        })
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, RpcError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(map_transport_error),
            Err(_) => Err(RpcError::Timeout(self.timeout)),
        }
    }
}

#[async_trait::async_trait]
impl ChainRpc for BlockchainClient {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.bounded(async { self.provider.get_chain_id().await }).await
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, RpcError> {
        self.bounded(async { self.provider.get_transaction_count(address).pending().await })
            .await
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        self.bounded(async { self.provider.get_gas_price().await }).await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError> {
        self.bounded(async {
            let pending = self.provider.send_raw_transaction(&raw).await?;
            Ok(*pending.tx_hash())
        })
        .await
    }
}

fn map_transport_error(err: TransportError) -> RpcError {
    match err.as_error_resp() {
        Some(payload) => RpcError::Rejected {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => RpcError::Transport(err.to_string()),
    }
}

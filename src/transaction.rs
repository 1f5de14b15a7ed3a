use crate::blockchain::ChainRpc;
use crate::contracts::{VibeOracleContract, RELAYER_USERNAME};
use crate::error::BuildError;
use alloy::primitives::{Address, Bytes, U256};
use std::sync::Arc;
use tracing::debug;

/// Where relayed scores go. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub contract_address: Address,
    pub function_signature: &'static str,
    pub chain_id: u64,
}

impl RelayTarget {
    pub fn new(contract_address: Address, chain_id: u64) -> Self {
        Self {
            contract_address,
            function_signature: VibeOracleContract::SUBMIT_SENTIMENT_SIGNATURE,
            chain_id,
        }
    }
}

/// Unsigned contract call, built fresh every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub sequence_number: u64,
    pub destination: RelayTarget,
    pub encoded_call_data: Bytes,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
}

pub struct TransactionBuilder {
    rpc: Arc<dyn ChainRpc>,
    gas_limit: u64,
}

impl TransactionBuilder {
    pub fn new(rpc: Arc<dyn ChainRpc>, gas_limit: u64) -> Self {
        Self { rpc, gas_limit }
    }

    /// Encodes `submitSentiment("relayer", text_preview, signed_score)` and attaches the
    /// sender's pending nonce and the node's suggested gas price.
    ///
    /// The nonce is always read from the node, never cached, so a rejected submission
    /// does not consume a sequence number.
    pub async fn build(
        &self,
        target: &RelayTarget,
        signed_score: i64,
        text_preview: &str,
        sender: Address,
    ) -> Result<TransactionRequest, BuildError> {
        let encoded_call_data =
            VibeOracleContract::encode_submit_sentiment(RELAYER_USERNAME, text_preview, signed_score)?;

        let sequence_number = self
            .rpc
            .pending_nonce(sender)
            .await
            .map_err(|source| BuildError::NetworkQuery {
                query: "pending nonce",
                source,
            })?;

        let gas_price = self
            .rpc
            .gas_price()
            .await
            .map_err(|source| BuildError::NetworkQuery {
                query: "gas price",
                source,
            })?;

        debug!(nonce = sequence_number, gas_price, gas_limit = self.gas_limit, "Assembled transaction");

        Ok(TransactionRequest {
            sequence_number,
            destination: target.clone(),
            encoded_call_data,
            value: U256::ZERO,
            gas_limit: self.gas_limit,
            gas_price,
        })
    }
}

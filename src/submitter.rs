use crate::blockchain::ChainRpc;
use crate::error::SubmissionError;
use crate::signer::SignedTransaction;
use alloy::primitives::B256;
use std::sync::Arc;
use tracing::warn;

/// Sends signed transactions. Acceptance by the node is success; receipts are not awaited.
pub struct Submitter {
    rpc: Arc<dyn ChainRpc>,
}

impl Submitter {
    pub fn new(rpc: Arc<dyn ChainRpc>) -> Self {
        Self { rpc }
    }

    pub async fn submit(&self, signed_tx: &SignedTransaction) -> Result<B256, SubmissionError> {
        let accepted = self.rpc.send_raw_transaction(signed_tx.raw.clone()).await?;

        if accepted != signed_tx.transaction_hash {
            warn!(
                local = %signed_tx.transaction_hash,
                node = %accepted,
                "Node reported a different transaction hash"
            );
        }

        Ok(accepted)
    }
}

use crate::error::SigningError;
use crate::transaction::TransactionRequest;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxKind, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use std::str::FromStr;

/// A transaction ready for submission. Never reused across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub request: TransactionRequest,
    /// 65-byte `r || s || y_parity` signature.
    pub signature: Bytes,
    pub transaction_hash: B256,
    /// EIP-155 legacy RLP encoding, as sent to `eth_sendRawTransaction`.
    pub raw: Bytes,
}

/// Local secp256k1 signer holding the relayer's key.
#[derive(Clone)]
pub struct TransactionSigner {
    signer: PrivateKeySigner,
    chain_id: Option<u64>,
}

impl TransactionSigner {
    /// Accepts a 32-byte hex key with or without the `0x` prefix.
    pub fn from_private_key(private_key: &str) -> Result<Self, SigningError> {
        let signer = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        Ok(Self {
            signer,
            chain_id: None,
        })
    }

    /// Pins the signer to `chain_id`; signing for any other chain fails.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs `request` bound to `chain_id` (EIP-155). RFC 6979 nonces make the
    /// signature deterministic for a given request and chain.
    pub fn sign(
        &self,
        request: &TransactionRequest,
        chain_id: u64,
    ) -> Result<SignedTransaction, SigningError> {
        if let Some(bound) = self.chain_id {
            if bound != chain_id {
                return Err(SigningError::ChainMismatch {
                    bound,
                    requested: chain_id,
                });
            }
        }

        let tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce: request.sequence_number,
            gas_price: request.gas_price,
            gas_limit: request.gas_limit,
            to: TxKind::Call(request.destination.contract_address),
            value: request.value,
            input: request.encoded_call_data.clone(),
        };

        let signature = self.signer.sign_hash_sync(&tx.signature_hash())?;
        let signed = tx.into_signed(signature);
        let transaction_hash = *signed.hash();
        let raw = TxEnvelope::from(signed).encoded_2718();

        Ok(SignedTransaction {
            request: request.clone(),
            signature: Bytes::copy_from_slice(&signature.as_bytes()),
            transaction_hash,
            raw: raw.into(),
        })
    }
}

impl std::fmt::Debug for TransactionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSigner")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

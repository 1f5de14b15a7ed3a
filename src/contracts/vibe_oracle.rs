use crate::error::BuildError;
use alloy::primitives::{keccak256, Bytes, I256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    interface IVibeOracle {
        function submitSentiment(string username, string text, int256 sentimentScore) external;
    }
}

/// Username recorded on-chain for every relayed score.
pub const RELAYER_USERNAME: &str = "relayer";

/// Static descriptor of the oracle contract's write interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibeOracleContract;

impl VibeOracleContract {
    pub const SUBMIT_SENTIMENT_SIGNATURE: &'static str = IVibeOracle::submitSentimentCall::SIGNATURE;
    pub const SUBMIT_SENTIMENT_SELECTOR: [u8; 4] = IVibeOracle::submitSentimentCall::SELECTOR;

    /// Checked once at startup: the compiled selector must match the signature hash.
    pub fn verify_interface() -> Result<(), BuildError> {
        let digest = keccak256(Self::SUBMIT_SENTIMENT_SIGNATURE.as_bytes());
        if digest[..4] != Self::SUBMIT_SENTIMENT_SELECTOR {
            return Err(BuildError::Encoding(format!(
                "selector 0x{} does not match signature {}",
                hex::encode(Self::SUBMIT_SENTIMENT_SELECTOR),
                Self::SUBMIT_SENTIMENT_SIGNATURE
            )));
        }
        Ok(())
    }

    pub fn encode_submit_sentiment(
        username: &str,
        text: &str,
        sentiment_score: i64,
    ) -> Result<Bytes, BuildError> {
        let sentiment_score = I256::try_from(sentiment_score)
            .map_err(|e| BuildError::Encoding(format!("score {}: {}", sentiment_score, e)))?;

        let call = IVibeOracle::submitSentimentCall {
            username: username.to_string(),
            text: text.to_string(),
            sentimentScore: sentiment_score,
        };
        Ok(call.abi_encode().into())
    }
}

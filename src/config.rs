use crate::error::ConfigError;
use alloy::primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/current";
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_RELAY_INTERVAL_SECONDS: u64 = 30;
/// Hand-tuned upper bound for `submitSentiment`; gas is not estimated per cycle.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;
pub const MAX_RETRY_DELAY_SECONDS: u64 = 3_600;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelayerConfig {
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub chain: ChainSettings,
    #[serde(default)]
    pub contract: ContractSettings,
    #[serde(default)]
    pub signer: SignerSettings,
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedSettings {
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainSettings {
    pub rpc_url: String,
    /// When set, a node reporting a different chain id is a startup error.
    pub chain_id: Option<u64>,
    pub rpc_timeout_seconds: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            rpc_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractSettings {
    pub address: String,
}

#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerSettings {
    pub private_key: String,
}

impl fmt::Debug for SignerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerSettings")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    pub interval_seconds: u64,
    pub gas_limit: u64,
    pub dry_run: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_RELAY_INTERVAL_SECONDS,
            gas_limit: DEFAULT_GAS_LIMIT,
            dry_run: false,
        }
    }
}

impl RelaySettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Backoff for establishing the initial RPC connection. Relay cycles are never retried.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_seconds: u64,
    pub max_delay_seconds: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_seconds: 2,
            max_delay_seconds: 30,
            backoff_multiplier: 2.0,
        }
    }
}

impl RelayerConfig {
    /// Loads a TOML config file, substituting `${VAR}` placeholders from the environment.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let content = Self::substitute_env_vars(content);

        let config: RelayerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the config from `API_URL`, `RPC_URL`, `CONTRACT_ADDRESS`, `PRIVATE_KEY`
    /// and `RELAY_INTERVAL`, plus the optional `CHAIN_ID`, `GAS_LIMIT`, `FEED_TIMEOUT`
    /// and `RPC_TIMEOUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = RelayerConfig::default();

        if let Some(api_url) = get("API_URL") {
            config.feed.api_url = api_url;
        }
        if let Some(rpc_url) = get("RPC_URL") {
            config.chain.rpc_url = rpc_url;
        }
        config.contract.address = get("CONTRACT_ADDRESS").ok_or(ConfigError::Missing("CONTRACT_ADDRESS"))?;
        config.signer.private_key = get("PRIVATE_KEY").ok_or(ConfigError::Missing("PRIVATE_KEY"))?;

        if let Some(raw) = get("RELAY_INTERVAL") {
            config.relay.interval_seconds = parse_number("RELAY_INTERVAL", &raw)?;
        }
        if let Some(raw) = get("GAS_LIMIT") {
            config.relay.gas_limit = parse_number("GAS_LIMIT", &raw)?;
        }
        if let Some(raw) = get("CHAIN_ID") {
            config.chain.chain_id = Some(parse_number("CHAIN_ID", &raw)?);
        }
        if let Some(raw) = get("FEED_TIMEOUT") {
            config.feed.timeout_seconds = parse_number("FEED_TIMEOUT", &raw)?;
        }
        if let Some(raw) = get("RPC_TIMEOUT") {
            config.chain.rpc_timeout_seconds = parse_number("RPC_TIMEOUT", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_unset(&self.contract.address) {
            return Err(ConfigError::Missing("CONTRACT_ADDRESS"));
        }
        if is_unset(&self.signer.private_key) {
            return Err(ConfigError::Missing("PRIVATE_KEY"));
        }
        self.contract_address()?;

        if self.relay.interval_seconds == 0 {
            return Err(invalid("RELAY_INTERVAL", "must be at least 1 second"));
        }
        if self.relay.gas_limit == 0 {
            return Err(invalid("GAS_LIMIT", "must be positive"));
        }
        if self.feed.timeout_seconds == 0 {
            return Err(invalid("FEED_TIMEOUT", "must be at least 1 second"));
        }
        if self.chain.rpc_timeout_seconds == 0 {
            return Err(invalid("RPC_TIMEOUT", "must be at least 1 second"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        let multiplier = self.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(invalid(
                "retry.backoff_multiplier",
                format!("must be a finite number >= 1.0, got {}", multiplier),
            ));
        }
        if self.retry.max_delay_seconds > MAX_RETRY_DELAY_SECONDS {
            return Err(invalid(
                "retry.max_delay_seconds",
                format!("must not exceed {} seconds", MAX_RETRY_DELAY_SECONDS),
            ));
        }
        if self.retry.base_delay_seconds > self.retry.max_delay_seconds {
            return Err(invalid(
                "retry.base_delay_seconds",
                "must not exceed retry.max_delay_seconds",
            ));
        }
        Ok(())
    }

    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        Address::from_str(self.contract.address.trim())
            .map_err(|e| invalid("CONTRACT_ADDRESS", e.to_string()))
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.timeout_seconds)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.chain.rpc_timeout_seconds)
    }

    fn substitute_env_vars(content: String) -> String {
        let mut result = content.clone();

        for cap in PLACEHOLDER.captures_iter(&content) {
            let var_name = &cap[1];
            if let Ok(value) = env::var(var_name) {
                let placeholder = cap[0].to_string();
                result = result.replace(&placeholder, &value);
            }
        }

        result
    }
}

// Unsubstituted `${VAR}` placeholders count as missing.
fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with("${")
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, format!("'{}': {}", raw, e)))
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

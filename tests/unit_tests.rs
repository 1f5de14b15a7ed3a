use anyhow::Result;
use sentiment_relayer::config::RelayerConfig;
use sentiment_relayer::error::ConfigError;
use sentiment_relayer::score::signed_score;
use sentiment_relayer::OracleScore;
use std::time::Duration;

const FULL_CONFIG: &str = r#"
[feed]
api_url = "http://sentiment.internal:8000/current"
timeout_seconds = 3

[chain]
rpc_url = "http://localhost:8545"
chain_id = 31337
rpc_timeout_seconds = 8

[contract]
address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

[signer]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

[relay]
interval_seconds = 15
gas_limit = 250000

[retry]
max_attempts = 5
base_delay_seconds = 1
max_delay_seconds = 10
backoff_multiplier = 2.0
"#;

fn write_temp_config(name: &str, content: &str) -> Result<std::path::PathBuf> {
    let temp_file = std::env::temp_dir().join(format!(
        "{}_{}_{}.toml",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_nanos()
    ));
    std::fs::write(&temp_file, content)?;
    Ok(temp_file)
}

#[test]
fn test_config_loading() -> Result<()> {
    let temp_file = write_temp_config("relayer_config", FULL_CONFIG)?;
    let config = RelayerConfig::load(temp_file.to_str().unwrap())?;
    std::fs::remove_file(&temp_file)?;

    assert_eq!(config.feed.api_url, "http://sentiment.internal:8000/current");
    assert_eq!(config.feed_timeout(), Duration::from_secs(3));
    assert_eq!(config.chain.chain_id, Some(31337));
    assert_eq!(config.rpc_timeout(), Duration::from_secs(8));
    assert_eq!(config.relay.interval(), Duration::from_secs(15));
    assert_eq!(config.relay.gas_limit, 250_000);
    assert!(!config.relay.dry_run);
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(
        config.contract_address()?.to_string(),
        "0x5FbDB2315678afecb367f032d93F642f64180aa3"
    );

    println!("✅ Config loading test passed");
    Ok(())
}

#[test]
fn test_minimal_config_uses_defaults() -> Result<()> {
    let content = r#"
[contract]
address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

[signer]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#;
    let temp_file = write_temp_config("relayer_minimal_config", content)?;
    let config = RelayerConfig::load(temp_file.to_str().unwrap())?;
    std::fs::remove_file(&temp_file)?;

    assert_eq!(config.feed.api_url, "http://localhost:8000/current");
    assert_eq!(config.chain.rpc_url, "http://localhost:8545");
    assert_eq!(config.chain.chain_id, None);
    assert_eq!(config.relay.interval(), Duration::from_secs(30));
    assert_eq!(config.relay.gas_limit, 200_000);
    assert_eq!(config.retry.max_attempts, 3);

    println!("✅ Minimal config test passed");
    Ok(())
}

#[test]
fn test_environment_variable_substitution() -> Result<()> {
    std::env::set_var("SENTIMENT_TEST_RPC_URL", "https://rpc.example.com");
    std::env::set_var(
        "SENTIMENT_TEST_PRIVATE_KEY",
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    );

    let content = r#"
[chain]
rpc_url = "${SENTIMENT_TEST_RPC_URL}"

[contract]
address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

[signer]
private_key = "${SENTIMENT_TEST_PRIVATE_KEY}"
"#;
    let temp_file = write_temp_config("relayer_env_config", content)?;
    let config = RelayerConfig::load(temp_file.to_str().unwrap())?;
    std::fs::remove_file(&temp_file)?;

    assert_eq!(config.chain.rpc_url, "https://rpc.example.com");
    assert_eq!(
        config.signer.private_key,
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
    );

    std::env::remove_var("SENTIMENT_TEST_RPC_URL");
    std::env::remove_var("SENTIMENT_TEST_PRIVATE_KEY");

    println!("✅ Environment variable substitution test passed");
    Ok(())
}

#[test]
fn test_unresolved_placeholder_counts_as_missing() -> Result<()> {
    let content = r#"
[contract]
address = "${SENTIMENT_TEST_UNSET_CONTRACT_ADDRESS}"

[signer]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#;
    let temp_file = write_temp_config("relayer_placeholder_config", content)?;
    let result = RelayerConfig::load(temp_file.to_str().unwrap());
    std::fs::remove_file(&temp_file)?;

    assert!(matches!(result, Err(ConfigError::Missing("CONTRACT_ADDRESS"))));

    println!("✅ Unresolved placeholder test passed");
    Ok(())
}

#[test]
fn test_zero_interval_rejected_from_file() -> Result<()> {
    let content = FULL_CONFIG.replace("interval_seconds = 15", "interval_seconds = 0");
    let temp_file = write_temp_config("relayer_zero_interval_config", &content)?;
    let result = RelayerConfig::load(temp_file.to_str().unwrap());
    std::fs::remove_file(&temp_file)?;

    assert!(matches!(result, Err(ConfigError::Invalid { key: "RELAY_INTERVAL", .. })));

    println!("✅ Zero interval test passed");
    Ok(())
}

#[test]
fn test_degenerate_retry_settings_rejected_from_file() -> Result<()> {
    for (setting, key) in [
        ("backoff_multiplier = -2.0", "retry.backoff_multiplier"),
        ("backoff_multiplier = nan", "retry.backoff_multiplier"),
        ("backoff_multiplier = 0.5", "retry.backoff_multiplier"),
        ("max_delay_seconds = 86400", "retry.max_delay_seconds"),
    ] {
        let field = setting.split(" = ").next().unwrap();
        let original = FULL_CONFIG
            .lines()
            .find(|line| line.starts_with(field))
            .unwrap();
        let content = FULL_CONFIG.replace(original, setting);
        let temp_file = write_temp_config("relayer_retry_config", &content)?;
        let result = RelayerConfig::load(temp_file.to_str().unwrap());
        std::fs::remove_file(&temp_file)?;

        match result {
            Err(ConfigError::Invalid { key: rejected, .. }) => assert_eq!(rejected, key),
            other => panic!("expected {} to be rejected, got {:?}", setting, other),
        }
    }

    println!("✅ Retry settings validation test passed");
    Ok(())
}

#[test]
fn test_missing_config_file_is_io_error() {
    let result = RelayerConfig::load("/nonexistent/sentiment-relayer.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));

    println!("✅ Missing config file test passed");
}

#[test]
fn test_score_transform_end_to_end_example() {
    let score = OracleScore::try_from(75i64).unwrap();
    assert_eq!(signed_score(score), 50);
    assert!(OracleScore::try_from(101i64).is_err());

    println!("✅ Score transform test passed");
}

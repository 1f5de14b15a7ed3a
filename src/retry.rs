use crate::config::RetrySettings;
use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryConfig {
    fn from(settings: RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.base_delay_seconds),
            Duration::from_secs(settings.max_delay_seconds),
            settings.backoff_multiplier,
        )
    }
}

impl RetryConfig {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }
}

/// Runs `operation` until it succeeds or `max_attempts` is reached, sleeping with
/// exponential backoff in between. Only used for startup work; relay cycles skip
/// to the next tick instead.
pub async fn execute_with_retry<F, Fut, T, E>(
    operation: F,
    retry_config: &RetryConfig,
    operation_name: &str,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>> + Send,
    E: std::fmt::Display + Send + Sync + 'static,
{
    let max_attempts = retry_config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        info!("🔄 {} attempt {}/{}", operation_name, attempt, max_attempts);

        match operation().await {
            Ok(result) => {
                info!("✅ {} succeeded on attempt {}", operation_name, attempt);
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => {
                return Err(anyhow::anyhow!(
                    "{} failed after {} attempts. Last error: {}",
                    operation_name,
                    max_attempts,
                    e
                ));
            }
            Err(e) => {
                warn!("❌ {} failed on attempt {}: {}", operation_name, attempt, e);
                let delay = calculate_delay(attempt, retry_config);
                info!("⏳ Waiting {:?} before retry...", delay);
                sleep(delay).await;
            }
        }

        attempt += 1;
    }
}

fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let exponential_delay =
        config.base_delay.as_secs_f64() * config.backoff_multiplier.powi((attempt - 1) as i32);

    let delay_seconds = exponential_delay.min(config.max_delay.as_secs_f64());
    Duration::try_from_secs_f64(delay_seconds)
        .unwrap_or(config.max_delay)
        .min(config.max_delay)
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use sentiment_relayer::{ChainRpc, RelayService, RelaySession, RelayerConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sentiment-relayer")]
#[command(about = "Relays off-chain sentiment scores to the on-chain oracle contract")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay loop
    Run {
        /// TOML config file; environment variables are used when omitted
        #[arg(long)]
        config: Option<String>,
        /// Run a single relay cycle and exit
        #[arg(long)]
        once: bool,
        /// Build and sign transactions without submitting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate configuration, key and node connectivity without submitting anything
    Check {
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            once,
            dry_run,
        } => {
            let config = load_config(config.as_deref())?;
            info!("🚀 Sentiment relayer starting...");

            let session = RelaySession::connect(&config)
                .await?
                .with_dry_run(dry_run || config.relay.dry_run);

            let mut service = RelayService::new(session);
            if once {
                service = service.with_max_cycles(1);
            }
            info!("✅ Relayer initialized. Starting relay loop...");

            let shutdown = CancellationToken::new();
            tokio::spawn(wait_for_shutdown(shutdown.clone()));

            service.run(shutdown).await?;
        }
        Commands::Check { config } => {
            let config = load_config(config.as_deref())?;
            let session = RelaySession::connect(&config).await?;

            let nonce = session
                .rpc()
                .pending_nonce(session.address())
                .await
                .context("Failed to read pending nonce")?;

            println!("✅ Configuration valid");
            println!("   Relayer address: {}", session.address());
            println!("   Chain ID: {}", session.target().chain_id);
            println!("   Contract: {}", session.target().contract_address);
            println!("   Function: {}", session.target().function_signature);
            println!("   Pending nonce: {}", nonce);
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<RelayerConfig> {
    let config = match path {
        Some(path) => RelayerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => RelayerConfig::from_env().context("Invalid environment configuration")?,
    };
    Ok(config)
}

async fn wait_for_shutdown(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    token.cancel();
}

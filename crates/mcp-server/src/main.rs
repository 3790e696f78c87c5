//! MCP gateway entry point.
//!
//! Run the gateway via stdio transport:
//!
//! ```bash
//! mcp-gateway --config ~/.config/mcp-gateway/config.toml
//! ```
//!
//! Or register it with an MCP client:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "gateway": {
//!       "command": "mcp-gateway",
//!       "args": ["--config", "/path/to/config.toml"]
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use mcp_gateway_adaptive::{MaskingEngine, RegistryStore, spawn_flush_task};
use mcp_gateway_core::{GatewayConfig, default_config_path};
use mcp_gateway_hub::Hub;
use mcp_gateway_oracle::LlmClassifier;
use mcp_gateway_server::{GatewayService, Orchestrator};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Federating MCP gateway with adaptive response masking.
#[derive(Parser, Debug)]
#[command(name = "mcp-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, env = "MCP_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Registry file, overriding the configured location
    #[arg(long, env = "MCP_GATEWAY_REGISTRY")]
    registry: Option<PathBuf>,

    /// Seconds between registry flushes, overriding the configured value
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    flush_interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is for MCP protocol)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mcp_gateway=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting mcp-gateway v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli
        .config
        .or_else(default_config_path)
        .context("no --config given and no platform config directory")?;
    let config = GatewayConfig::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let registry_path = cli
        .registry
        .unwrap_or_else(|| config.registry_path(&config_path));
    let registry = Arc::new(RegistryStore::load(registry_path).await);

    let hub = Hub::connect_all(&config)
        .await
        .context("failed to connect backends")?;
    tracing::info!("Connected {} backends", hub.len());

    let oracle_config = config.oracle()?.clone();
    let classify_timeout = oracle_config.timeout();
    let oracle = LlmClassifier::new(oracle_config).context("failed to build oracle client")?;

    let flush_interval = cli
        .flush_interval
        .map_or_else(|| config.flush_interval(), Duration::from_secs);
    let shutdown = CancellationToken::new();
    let flusher = spawn_flush_task(Arc::clone(&registry), flush_interval, shutdown.clone());

    let orchestrator = Orchestrator::new(Arc::new(hub), registry, Arc::new(oracle))
        .with_masking(MaskingEngine::new(config.max_floating_fields))
        .with_classify_timeout(classify_timeout);

    let service = GatewayService::new(orchestrator).serve(stdio()).await?;
    let served = service.waiting().await;

    shutdown.cancel();
    if let Err(e) = flusher.await {
        tracing::warn!("Registry flush task ended abnormally: {}", e);
    }

    served?;
    tracing::info!("Gateway shutdown complete");
    Ok(())
}

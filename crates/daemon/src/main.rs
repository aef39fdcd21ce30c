//! Remex Daemon - Main Entry Point
//!
//! Serves Launch / Poll / Stop of shell commands over loopback JSON-RPC.

mod config;

use anyhow::{Context, Result};
use config::{DaemonConfig, LogFormat};
use remex_api_rpc::RpcServer;
use remex_core::CommandManager;
use remex_infra_system::ShellLauncher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("remex=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging
    init_logging(config.log_format)?;
    info!("Remex daemon v{} starting...", VERSION);

    // 3. Wire dependencies
    let launcher = Arc::new(ShellLauncher::new());
    info!(shell = %launcher.shell().display(), "Using shell");

    let manager = Arc::new(
        CommandManager::new(config.manager.clone(), launcher)
            .context("Command manager setup failed")?,
    );
    info!(
        max_commands = config.manager.max_commands,
        stop_timeout_ms = config.manager.stop_timeout.as_millis() as u64,
        "Command table ready"
    );

    // 4. Start JSON-RPC server
    let (rpc_handle, addr) = RpcServer::new(config.rpc.clone(), manager.clone())
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(%addr, "System ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Shutdown signal received. Stopping commands...");

    // 6. Graceful shutdown
    if let Err(e) = rpc_handle.stop() {
        warn!(error = %e, "RPC server already stopped");
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, manager.shutdown())
        .await
        .is_err()
    {
        warn!("Timed out stopping commands");
    }

    info!("Shutdown complete.");
    Ok(())
}

//! Daemon configuration loaded from `REMEX_*` environment variables

use anyhow::{anyhow, Context, Result};
use remex_api_rpc::RpcServerConfig;
use remex_core::ManagerConfig;
use std::time::Duration;

pub const ENV_RPC_HOST: &str = "REMEX_RPC_HOST";
pub const ENV_RPC_PORT: &str = "REMEX_RPC_PORT";
pub const ENV_MAX_COMMANDS: &str = "REMEX_MAX_COMMANDS";
pub const ENV_STOP_TIMEOUT_MS: &str = "REMEX_STOP_TIMEOUT_MS";
pub const ENV_INITIAL_BUFFER_BYTES: &str = "REMEX_INITIAL_BUFFER_BYTES";
pub const ENV_LOG_FORMAT: &str = "REMEX_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub rpc: RpcServerConfig,
    pub manager: ManagerConfig,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rpc = RpcServerConfig::default();
        if let Some(host) = lookup(ENV_RPC_HOST) {
            rpc.host = host;
        }
        if let Some(port) = lookup(ENV_RPC_PORT) {
            rpc.port = port
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", ENV_RPC_PORT, port))?;
        }
        rpc.validate().map_err(|e| anyhow!(e))?;

        let mut manager = ManagerConfig::default();
        if let Some(max) = lookup(ENV_MAX_COMMANDS) {
            let max: usize = max.parse().with_context(|| {
                format!("{} must be a positive integer, got '{}'", ENV_MAX_COMMANDS, max)
            })?;
            manager = manager.with_max_commands(max);
        }
        if let Some(ms) = lookup(ENV_STOP_TIMEOUT_MS) {
            let ms: u64 = ms.parse().with_context(|| {
                format!("{} must be milliseconds, got '{}'", ENV_STOP_TIMEOUT_MS, ms)
            })?;
            manager = manager.with_stop_timeout(Duration::from_millis(ms));
        }
        if let Some(bytes) = lookup(ENV_INITIAL_BUFFER_BYTES) {
            let bytes: usize = bytes.parse().with_context(|| {
                format!("{} must be a byte count, got '{}'", ENV_INITIAL_BUFFER_BYTES, bytes)
            })?;
            manager = manager.with_initial_buffer_capacity(bytes);
        }
        manager
            .validate()
            .map_err(|e| anyhow!("invalid manager configuration: {}", e))?;

        let log_format = match lookup(ENV_LOG_FORMAT).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            rpc,
            manager,
            log_format,
        })
    }
}

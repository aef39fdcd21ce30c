//! JSON-RPC Server
//!
//! Serves the command manager over JSON-RPC 2.0 on loopback TCP.

use crate::handler::RpcHandler;
use crate::types::{LaunchRequest, PollRequest, StopRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use remex_core::CommandManager;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

// Requests arrive unauthenticated, so only loopback binds are accepted
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

impl RpcServerConfig {
    /// Reject anything that is not a loopback address
    pub fn validate(&self) -> Result<(), String> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(());
        }
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| format!("RPC host '{}' is not an IP address", self.host))?;
        if !ip.is_loopback() {
            return Err(format!(
                "RPC host '{}' is not a loopback address; refusing to bind",
                self.host
            ));
        }
        Ok(())
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, manager: Arc<CommandManager>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(manager)),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the handle and the bound address (useful with port 0).
    pub async fn start(self) -> Result<(ServerHandle, SocketAddr), String> {
        self.config.validate()?;
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("command.launch.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LaunchRequest = params.parse()?;
                    handler.launch(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("command.poll.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: PollRequest = params.parse()?;
                    handler.poll(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("command.stop.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StopRequest = params.parse()?;
                    handler.stop(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.stats().await }
            })
            .map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server listening (loopback only)");

        let handle = server.start(module);
        Ok((handle, local_addr))
    }
}

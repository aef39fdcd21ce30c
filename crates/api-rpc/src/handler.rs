//! RPC Method Handlers
//!
//! Translates JSON-RPC calls into command manager operations.

use crate::error::to_rpc_error;
use crate::types::{
    LaunchRequest, LaunchResponse, PollRequest, PollResponse, StatsResponse, StopRequest,
    StopResponse, LAUNCH_FAILED,
};
use jsonrpsee::types::ErrorObjectOwned;
use remex_core::{CommandManager, StopOutcome};
use std::sync::Arc;
use tracing::{info, warn};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    manager: Arc<CommandManager>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(manager: Arc<CommandManager>) -> Self {
        Self {
            manager,
            start_time: std::time::Instant::now(),
        }
    }

    /// command.launch.v1
    ///
    /// Table-full, rejected and failed spawns all answer `LAUNCH_FAILED`.
    pub async fn launch(&self, params: LaunchRequest) -> Result<LaunchResponse, ErrorObjectOwned> {
        info!(command = %params.command, "command.launch.v1");

        match self.manager.launch(&params.command).await {
            Ok(command_id) => Ok(LaunchResponse { command_id }),
            Err(e) if e.is_launch_failure() => {
                warn!(error = %e, "Launch failed");
                Ok(LaunchResponse {
                    command_id: LAUNCH_FAILED,
                })
            }
            Err(e) => Err(to_rpc_error(e)),
        }
    }

    /// command.poll.v1
    pub async fn poll(&self, params: PollRequest) -> Result<PollResponse, ErrorObjectOwned> {
        let snapshot = self
            .manager
            .poll(params.command_id)
            .map_err(to_rpc_error)?;

        Ok(PollResponse::from(snapshot))
    }

    /// command.stop.v1
    pub async fn stop(&self, params: StopRequest) -> Result<StopResponse, ErrorObjectOwned> {
        info!(command_id = params.command_id, "command.stop.v1");

        let outcome = self
            .manager
            .stop(params.command_id)
            .await
            .map_err(to_rpc_error)?;

        if outcome == StopOutcome::CollectorTimedOut {
            warn!(
                command_id = params.command_id,
                "Stop acknowledged with collector still running"
            );
        }

        Ok(StopResponse {
            command_id: params.command_id,
            stopped: true,
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self) -> Result<StatsResponse, ErrorObjectOwned> {
        Ok(StatsResponse::new(
            self.manager.stats(),
            self.start_time.elapsed().as_secs(),
        ))
    }
}

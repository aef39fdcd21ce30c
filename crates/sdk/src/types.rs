//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from api-rpc crate.

use serde::Deserialize;

/// `command_id` the daemon answers when a launch started nothing
pub const LAUNCH_FAILED: i64 = -1;

/// Response from command.launch.v1
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchResponse {
    pub command_id: i64,
}

/// Response from command.poll.v1
#[derive(Debug, Clone, Deserialize)]
pub struct PollResponse {
    pub command_id: i64,
    pub output: String,
    pub output_bytes: usize,
    pub finished: bool,
    pub exit_code: Option<i32>,
}

/// Response from command.stop.v1
#[derive(Debug, Clone, Deserialize)]
pub struct StopResponse {
    pub command_id: i64,
    pub stopped: bool,
}

/// Response from admin.stats.v1
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub capacity: usize,
    pub tracked: usize,
    pub active: usize,
    pub finished: usize,
    pub launched_total: u64,
    pub uptime_seconds: u64,
}

//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use remex_core::{CommandSnapshot, ManagerStats};
use serde::{Deserialize, Serialize};

/// `command_id` returned by command.launch.v1 when nothing was started
pub const LAUNCH_FAILED: i64 = -1;

/// command.launch.v1 - Launch a shell command
#[derive(Debug, Deserialize)]
pub struct LaunchRequest {
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchResponse {
    pub command_id: i64,
}

/// command.poll.v1 - Snapshot a command's output
#[derive(Debug, Deserialize)]
pub struct PollRequest {
    pub command_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub command_id: i64,
    /// Full output so far, lossily decoded as UTF-8
    pub output: String,
    /// Raw byte length of the output
    pub output_bytes: usize,
    pub finished: bool,
    pub exit_code: Option<i32>,
}

impl From<CommandSnapshot> for PollResponse {
    fn from(snapshot: CommandSnapshot) -> Self {
        Self {
            command_id: snapshot.id,
            output_bytes: snapshot.output.len(),
            output: String::from_utf8_lossy(&snapshot.output).into_owned(),
            finished: snapshot.finished,
            exit_code: snapshot.exit_code,
        }
    }
}

/// command.stop.v1 - Stop a command and release it
#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub command_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopResponse {
    pub command_id: i64,
    pub stopped: bool,
}

/// admin.stats.v1 - Get table statistics (no parameters)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub capacity: usize,
    pub tracked: usize,
    pub active: usize,
    pub finished: usize,
    pub launched_total: u64,
    pub uptime_seconds: u64,
}

impl StatsResponse {
    pub fn new(stats: ManagerStats, uptime_seconds: u64) -> Self {
        Self {
            capacity: stats.capacity,
            tracked: stats.tracked,
            active: stats.active,
            finished: stats.finished,
            launched_total: stats.launched_total,
            uptime_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_response_from_snapshot() {
        let response = PollResponse::from(CommandSnapshot {
            id: 9,
            output: b"hello\n".to_vec(),
            finished: true,
            exit_code: Some(0),
        });

        assert_eq!(response.command_id, 9);
        assert_eq!(response.output, "hello\n");
        assert_eq!(response.output_bytes, 6);
        assert!(response.finished);
    }

    #[test]
    fn test_poll_response_keeps_raw_length_for_invalid_utf8() {
        let response = PollResponse::from(CommandSnapshot {
            id: 1,
            output: vec![0x66, 0xff, 0x6f],
            finished: false,
            exit_code: None,
        });

        assert_eq!(response.output_bytes, 3);
        assert_eq!(response.output, "f\u{fffd}o");
    }

    #[test]
    fn test_requests_deserialize_from_named_params() {
        let launch: LaunchRequest =
            serde_json::from_value(serde_json::json!({"command": "echo hi"})).unwrap();
        assert_eq!(launch.command, "echo hi");

        let poll: PollRequest =
            serde_json::from_value(serde_json::json!({"command_id": 3})).unwrap();
        assert_eq!(poll.command_id, 3);
    }
}

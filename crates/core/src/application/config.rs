// Manager Configuration

use super::constants::*;
use crate::error::{AppError, Result};
use std::time::Duration;

/// Tunables for a [`CommandManager`](super::CommandManager)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Table capacity `N`
    pub max_commands: usize,
    /// Longest accepted command line in bytes
    pub max_command_bytes: usize,
    /// Bytes reserved for each new output buffer
    pub initial_buffer_capacity: usize,
    /// Collector read size
    pub read_chunk_size: usize,
    /// Bound on Stop's wait for the collector
    pub stop_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_commands: DEFAULT_MAX_COMMANDS,
            max_command_bytes: DEFAULT_MAX_COMMAND_BYTES,
            initial_buffer_capacity: DEFAULT_INITIAL_BUFFER_CAPACITY,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

impl ManagerConfig {
    pub fn with_max_commands(mut self, max_commands: usize) -> Self {
        self.max_commands = max_commands;
        self
    }

    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    pub fn with_initial_buffer_capacity(mut self, capacity: usize) -> Self {
        self.initial_buffer_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_commands == 0 {
            return Err(AppError::Validation(
                "max_commands must be at least 1".to_string(),
            ));
        }
        if self.max_command_bytes == 0 {
            return Err(AppError::Validation(
                "max_command_bytes must be at least 1".to_string(),
            ));
        }
        if self.read_chunk_size == 0 {
            return Err(AppError::Validation(
                "read_chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Check a command line against the configured limits
    pub fn validate_command_line(&self, command_line: &str) -> Result<()> {
        if command_line.trim().is_empty() {
            return Err(AppError::Validation("command is empty".to_string()));
        }
        if command_line.len() > self.max_command_bytes {
            return Err(AppError::Validation(format!(
                "command is {} bytes, limit is {}",
                command_line.len(),
                self.max_command_bytes
            )));
        }
        if command_line.contains('\0') {
            return Err(AppError::Validation(
                "command contains a NUL byte".to_string(),
            ));
        }
        Ok(())
    }
}

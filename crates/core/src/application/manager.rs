// Command Manager - Launch / Poll / Stop facade

use super::collector;
use super::command_table::{CollectorHandle, CommandTable};
use super::config::ManagerConfig;
use super::stop_signal::stop_channel;
use crate::domain::{CommandId, CommandSnapshot, CommandState};
use crate::error::{AppError, Result};
use crate::port::ProcessLauncher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Result of a successful Stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Collector exited within the stop timeout
    Stopped,
    /// Collector missed the timeout; slot was released anyway and the task
    /// finishes on its own against the released command
    CollectorTimedOut,
}

/// Table occupancy counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerStats {
    pub capacity: usize,
    pub tracked: usize,
    pub active: usize,
    pub finished: usize,
    pub launched_total: u64,
}

/// In-memory registry of launched commands.
///
/// Construct once and share behind an `Arc`; every operation takes `&self`.
/// Output buffers are owned by the command itself, not by its table slot, so a
/// collector that outlives Stop writes into a released command and is then dropped.
pub struct CommandManager {
    config: ManagerConfig,
    table: CommandTable,
    launcher: Arc<dyn ProcessLauncher>,
    launched_total: AtomicU64,
}

impl CommandManager {
    /// Create a new manager
    ///
    /// # Errors
    /// - AppError::Validation if the config is unusable
    pub fn new(config: ManagerConfig, launcher: Arc<dyn ProcessLauncher>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: CommandTable::new(config.max_commands, config.initial_buffer_capacity),
            config,
            launcher,
            launched_total: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Launch `command_line` and return its id.
    ///
    /// A collector task starts draining the output before this returns.
    ///
    /// # Errors
    /// - AppError::Validation if the command line is empty, too long or contains NUL
    /// - AppError::ResourceExhausted if the table is full
    /// - AppError::Launch if the process cannot be spawned (the slot is released)
    pub async fn launch(&self, command_line: &str) -> Result<CommandId> {
        self.config.validate_command_line(command_line)?;

        let tracked = self.table.allocate(command_line).inspect_err(|e| {
            warn!(error = %e, "Launch rejected");
        })?;
        let id = tracked.id();

        let process = match self.launcher.spawn(command_line).await {
            Ok(process) => process,
            Err(e) => {
                warn!(command_id = id, error = %e, "Spawn failed, releasing slot");
                tracked.command().release();
                self.table.release(id);
                return Err(e.into());
            }
        };
        let pid = process.child.id();

        let (stop, token) = stop_channel();
        let span = info_span!("collector", command_id = id);
        let task = tokio::spawn(
            collector::collect(
                tracked.command().clone(),
                process,
                token,
                self.config.read_chunk_size,
            )
            .instrument(span),
        );
        tracked.attach_collector(CollectorHandle { stop, task });

        self.launched_total.fetch_add(1, Ordering::Relaxed);
        info!(
            command_id = id,
            slot = tracked.slot(),
            pid = ?pid,
            command = %command_line,
            "Command launched"
        );

        Ok(id)
    }

    /// Copy the full output collected so far and the finished flag.
    ///
    /// # Errors
    /// - AppError::NotFound if `id` was never launched or has been stopped
    pub fn poll(&self, id: CommandId) -> Result<CommandSnapshot> {
        let tracked = self.table.find(id).ok_or(AppError::NotFound(id))?;
        let snapshot = tracked
            .command()
            .snapshot()
            .ok_or(AppError::NotFound(id))?;

        debug!(
            command_id = id,
            bytes = snapshot.output.len(),
            finished = snapshot.finished,
            "Command polled"
        );
        Ok(snapshot)
    }

    /// Kill the command's process, wait (bounded) for its collector, then free
    /// the buffer and release the slot. The id is unknown afterwards.
    ///
    /// # Errors
    /// - AppError::NotFound if `id` is not resident or another Stop already claimed it
    pub async fn stop(&self, id: CommandId) -> Result<StopOutcome> {
        let tracked = self.table.find(id).ok_or(AppError::NotFound(id))?;
        let collector = tracked.begin_stop().ok_or(AppError::NotFound(id))?;

        let outcome = match collector {
            Some(handle) => {
                handle.stop.stop();
                match tokio::time::timeout(self.config.stop_timeout, handle.task).await {
                    Ok(Ok(exit)) => {
                        debug!(command_id = id, exit = ?exit, "Collector exited");
                        StopOutcome::Stopped
                    }
                    Ok(Err(e)) => {
                        warn!(command_id = id, error = %e, "Collector task failed");
                        StopOutcome::Stopped
                    }
                    Err(_) => {
                        warn!(
                            command_id = id,
                            timeout_ms = self.config.stop_timeout.as_millis() as u64,
                            "Collector did not exit in time, releasing slot anyway"
                        );
                        StopOutcome::CollectorTimedOut
                    }
                }
            }
            None => StopOutcome::Stopped,
        };

        tracked.command().release();
        self.table.release(id);

        info!(command_id = id, slot = tracked.slot(), outcome = ?outcome, "Command stopped");
        Ok(outcome)
    }

    /// Stop every resident command concurrently
    pub async fn shutdown(&self) {
        let entries = self.table.entries();
        if entries.is_empty() {
            return;
        }

        info!(count = entries.len(), "Stopping all commands");
        let stops = entries.iter().map(|tracked| self.stop(tracked.id()));
        let results = futures::future::join_all(stops).await;

        let timed_out = results
            .iter()
            .filter(|r| matches!(r, Ok(StopOutcome::CollectorTimedOut)))
            .count();
        if timed_out > 0 {
            warn!(timed_out, "Some collectors outlived shutdown");
        }
    }

    pub fn stats(&self) -> ManagerStats {
        let entries = self.table.entries();
        let finished = entries
            .iter()
            .filter(|tracked| tracked.command().state() == CommandState::Finished)
            .count();

        ManagerStats {
            capacity: self.table.capacity(),
            tracked: entries.len(),
            active: entries.len() - finished,
            finished,
            launched_total: self.launched_total.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager")
            .field("config", &self.config)
            .field("tracked", &self.table.len())
            .finish_non_exhaustive()
    }
}

// Command Domain Model

use super::error::{DomainError, Result};
use super::output_buffer::OutputBuffer;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Command ID (positive, strictly increasing per table)
pub type CommandId = i64;

/// Command State
///
/// `Finished` is only reached through a natural process exit. Release is
/// tracked separately because Stop may hit a command in either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Active,
    Finished,
}

impl std::fmt::Display for CommandState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandState::Active => write!(f, "ACTIVE"),
            CommandState::Finished => write!(f, "FINISHED"),
        }
    }
}

/// Point-in-time copy of a command's output and completion flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSnapshot {
    pub id: CommandId,
    pub output: Vec<u8>,
    pub finished: bool,
    pub exit_code: Option<i32>,
}

#[derive(Debug)]
struct CommandInner {
    state: CommandState,
    output: OutputBuffer,
    exit_code: Option<i32>,
    released: bool,
}

/// One tracked execution.
///
/// `state` and `output` sit behind a single mutex. It is only ever held for a
/// buffer append or copy, never across I/O.
#[derive(Debug)]
pub struct Command {
    id: CommandId,
    command_line: String,
    inner: Mutex<CommandInner>,
}

impl Command {
    pub fn new(id: CommandId, command_line: impl Into<String>, buffer_capacity: usize) -> Self {
        Self {
            id,
            command_line: command_line.into(),
            inner: Mutex::new(CommandInner {
                state: CommandState::Active,
                output: OutputBuffer::with_capacity(buffer_capacity),
                exit_code: None,
                released: false,
            }),
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    // The guarded data is valid after any panic, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, CommandInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append collected output. Returns false once the command is released,
    /// in which case the bytes are discarded.
    pub fn append_output(&self, bytes: &[u8]) -> bool {
        let mut inner = self.lock();
        if inner.released {
            return false;
        }
        inner.output.append(bytes);
        true
    }

    /// Active -> Finished, exactly once
    pub fn mark_finished(&self, exit_code: Option<i32>) -> Result<()> {
        let mut inner = self.lock();
        if inner.released {
            return Err(DomainError::Released(self.id));
        }
        if inner.state != CommandState::Active {
            return Err(DomainError::InvalidStateTransition {
                from: inner.state.to_string(),
                to: CommandState::Finished.to_string(),
            });
        }
        inner.state = CommandState::Finished;
        inner.exit_code = exit_code;
        Ok(())
    }

    /// Copy the entire buffer and the finished flag. `None` once released.
    pub fn snapshot(&self) -> Option<CommandSnapshot> {
        let inner = self.lock();
        if inner.released {
            return None;
        }
        Some(CommandSnapshot {
            id: self.id,
            output: inner.output.as_slice().to_vec(),
            finished: inner.state == CommandState::Finished,
            exit_code: inner.exit_code,
        })
    }

    pub fn state(&self) -> CommandState {
        self.lock().state
    }

    pub fn output_len(&self) -> usize {
        self.lock().output.len()
    }

    /// Free the buffer and refuse any further appends
    pub fn release(&self) {
        let mut inner = self.lock();
        inner.released = true;
        inner.output.free();
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_command_is_active_and_empty() {
        let command = Command::new(1, "echo hi", 16);
        let snapshot = command.snapshot().unwrap();

        assert_eq!(command.state(), CommandState::Active);
        assert!(snapshot.output.is_empty());
        assert!(!snapshot.finished);
        assert_eq!(snapshot.exit_code, None);
    }

    #[test]
    fn test_snapshot_returns_full_history() {
        let command = Command::new(1, "cmd", 0);
        command.append_output(b"b1");
        let first = command.snapshot().unwrap();
        command.append_output(b"b2");
        let second = command.snapshot().unwrap();

        assert_eq!(first.output, b"b1");
        assert_eq!(second.output, b"b1b2");
        assert!(second.output.starts_with(&first.output));
    }

    #[test]
    fn test_mark_finished_only_once() {
        let command = Command::new(7, "cmd", 0);
        command.mark_finished(Some(0)).unwrap();

        let err = command.mark_finished(Some(1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));

        let snapshot = command.snapshot().unwrap();
        assert!(snapshot.finished);
        assert_eq!(snapshot.exit_code, Some(0));
    }

    #[test]
    fn test_release_frees_buffer_and_hides_snapshot() {
        let command = Command::new(3, "cmd", 64);
        command.append_output(b"secret");
        command.release();

        assert!(command.is_released());
        assert!(command.snapshot().is_none());
        assert_eq!(command.output_len(), 0);
        assert!(!command.append_output(b"late"));
        assert_eq!(command.output_len(), 0);
    }

    #[test]
    fn test_mark_finished_after_release_is_rejected() {
        let command = Command::new(4, "cmd", 0);
        command.release();

        assert_eq!(command.mark_finished(None), Err(DomainError::Released(4)));
    }
}

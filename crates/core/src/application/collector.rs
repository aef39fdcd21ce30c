// Output Collector - one background task per active command

use super::stop_signal::StopToken;
use crate::domain::Command;
use crate::port::SpawnedProcess;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

/// How a collector run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorExit {
    /// Stream closed and the process exited on its own
    Finished { exit_code: Option<i32> },
    /// Stop was requested; the process was killed and reaped
    Stopped,
}

/// Drain `process.output` into `command` until end of stream, then wait for exit.
///
/// This task is the only writer of the command's buffer and the only caller of
/// `mark_finished`. A stop request at any point kills the process instead.
pub async fn collect(
    command: Arc<Command>,
    process: SpawnedProcess,
    mut stop: StopToken,
    read_chunk_size: usize,
) -> CollectorExit {
    let SpawnedProcess {
        mut child,
        mut output,
    } = process;
    let mut chunk = vec![0u8; read_chunk_size.max(1)];
    let mut collected: usize = 0;

    let stopped = loop {
        tokio::select! {
            read = output.read(&mut chunk) => match read {
                Ok(0) => break false,
                Ok(n) => {
                    if !command.append_output(&chunk[..n]) {
                        debug!(bytes = n, "Command released, discarding output");
                    }
                    collected += n;
                }
                Err(e) => {
                    warn!(error = %e, "Output stream read failed, waiting for exit");
                    break false;
                }
            },
            _ = stop.wait() => break true,
        }
    };

    // Read end is closed before waiting so a blocked writer gets EPIPE
    drop(output);

    let exit_code = if stopped {
        None
    } else {
        tokio::select! {
            status = child.wait() => match status {
                Ok(code) => Some(code),
                Err(e) => {
                    warn!(error = %e, "Waiting for process exit failed");
                    Some(None)
                }
            },
            _ = stop.wait() => None,
        }
    };

    match exit_code {
        Some(exit_code) => {
            if let Err(e) = command.mark_finished(exit_code) {
                debug!(error = %e, "Command not marked finished");
            }
            info!(bytes = collected, exit_code = ?exit_code, "Command finished");
            CollectorExit::Finished { exit_code }
        }
        None => {
            if let Err(e) = child.kill() {
                warn!(error = %e, "Failed to kill process");
            }
            match child.wait().await {
                Ok(code) => debug!(exit_code = ?code, "Killed process reaped"),
                Err(e) => warn!(error = %e, "Failed to reap killed process"),
            }
            info!(bytes = collected, "Collector stopped");
            CollectorExit::Stopped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::stop_signal::stop_channel;
    use crate::domain::CommandState;
    use crate::port::mocks::MockProcessLauncher;
    use crate::port::ProcessLauncher;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_collects_output_and_marks_finished() {
        let launcher = MockProcessLauncher::new_output("hello\n", 3);
        let process = launcher.spawn("echo hello").await.unwrap();
        let command = Arc::new(Command::new(1, "echo hello", 8));
        let (_sender, token) = stop_channel();

        let exit = collect(command.clone(), process, token, 2).await;

        assert_eq!(exit, CollectorExit::Finished { exit_code: Some(3) });
        let snapshot = command.snapshot().unwrap();
        assert_eq!(snapshot.output, b"hello\n");
        assert!(snapshot.finished);
        assert_eq!(snapshot.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_appends_chunks_in_order() {
        let launcher = MockProcessLauncher::new(crate::port::mocks::MockBehavior::Pipe);
        let process = launcher.spawn("producer").await.unwrap();
        let mut writer = launcher.take_writer().unwrap();
        let command = Arc::new(Command::new(1, "producer", 0));
        let (_sender, token) = stop_channel();

        let task = tokio::spawn(collect(command.clone(), process, token, 64));

        writer.write_all(b"b1").await.unwrap();
        writer.write_all(b"b2").await.unwrap();
        drop(writer);

        let exit = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit, CollectorExit::Finished { exit_code: Some(0) });
        assert_eq!(command.snapshot().unwrap().output, b"b1b2");
    }

    #[tokio::test]
    async fn test_stop_kills_hanging_process() {
        let launcher = MockProcessLauncher::new_hang();
        let process = launcher.spawn("sleep forever").await.unwrap();
        let command = Arc::new(Command::new(1, "sleep forever", 0));
        let (sender, token) = stop_channel();

        let task = tokio::spawn(collect(command.clone(), process, token, 64));
        sender.stop();

        let exit = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit, CollectorExit::Stopped);
        assert_eq!(launcher.kill_count(), 1);
        assert_eq!(command.state(), CommandState::Active);
    }
}

// Shell launcher implementation
// reason: tokio for async child management, nix for process-group kill
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use remex_core::port::{ChildProcess, LaunchError, OutputStream, ProcessLauncher, SpawnedProcess};

#[cfg(unix)]
const DEFAULT_SHELL: &str = "/bin/sh";
#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd.exe";

/// Shell launcher
/// Runs each command through the platform interpreter with stdout and stderr
/// merged into a single pipe. The parent keeps only the read end (close-on-exec).
pub struct ShellLauncher {
    shell: PathBuf,
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellLauncher {
    /// Create a launcher using the platform default interpreter
    pub fn new() -> Self {
        Self::with_shell(DEFAULT_SHELL)
    }

    /// Create a launcher using a specific interpreter
    ///
    /// # Example
    /// ```ignore
    /// let launcher = ShellLauncher::with_shell("/bin/bash");
    /// ```
    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    /// Spawn with both output streams on one pipe (Unix)
    #[cfg(unix)]
    fn spawn_merged(&self, command_line: &str) -> Result<(Child, OutputStream), LaunchError> {
        use std::os::fd::OwnedFd;
        use tokio::net::unix::pipe;

        let (reader, writer) = std::io::pipe()
            .map_err(|e| LaunchError::IoError(format!("pipe creation failed: {}", e)))?;
        let stderr_writer = writer
            .try_clone()
            .map_err(|e| LaunchError::IoError(format!("pipe clone failed: {}", e)))?;

        // The Command owns the parent's copies of the write end; it must be
        // dropped before reading or the stream never reaches EOF.
        let child = {
            let mut command = Command::new(&self.shell);
            command
                .arg("-c")
                .arg(command_line)
                .stdin(Stdio::null())
                .stdout(Stdio::from(writer))
                .stderr(Stdio::from(stderr_writer))
                .process_group(0)
                .kill_on_drop(true);
            command.spawn().map_err(|e| {
                LaunchError::SpawnFailed(format!("{}: {}", self.shell.display(), e))
            })?
        };

        let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))
            .map_err(|e| LaunchError::IoError(format!("pipe registration failed: {}", e)))?;

        Ok((child, Box::new(receiver)))
    }

    /// Spawn with stderr redirected into stdout by the interpreter (Windows)
    #[cfg(windows)]
    fn spawn_merged(&self, command_line: &str) -> Result<(Child, OutputStream), LaunchError> {
        let mut command = Command::new(&self.shell);
        command
            .arg("/C")
            .raw_arg(format!("({}) 2>&1", command_line))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed(format!("{}: {}", self.shell.display(), e)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LaunchError::IoError("stdout was not captured".to_string()))?;

        Ok((child, Box::new(stdout)))
    }
}

#[async_trait]
impl ProcessLauncher for ShellLauncher {
    async fn spawn(&self, command_line: &str) -> Result<SpawnedProcess, LaunchError> {
        let (child, output) = self.spawn_merged(command_line)?;
        let pid = child.id();

        debug!(pid = ?pid, shell = %self.shell.display(), "Child process spawned");

        Ok(SpawnedProcess {
            child: Box::new(ShellChild { child, pid }),
            output,
        })
    }
}

/// Spawned interpreter process
struct ShellChild {
    child: Child,
    pid: Option<u32>,
}

#[async_trait]
impl ChildProcess for ShellChild {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    async fn wait(&mut self) -> std::io::Result<Option<i32>> {
        let status = self.child.wait().await?;
        Ok(status.code())
    }

    /// SIGKILL the whole process group so grandchildren holding the pipe die too
    fn kill(&mut self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.pid {
                match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                    Ok(()) => return Ok(()),
                    Err(Errno::ESRCH) => debug!(pid = %pid, "Process group already gone"),
                    Err(e) => warn!(pid = %pid, error = %e, "killpg failed, killing leader only"),
                }
            }
        }

        match self.child.start_kill() {
            Ok(()) => Ok(()),
            // Already exited and reaped
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    async fn run_to_end(command_line: &str) -> (Vec<u8>, Option<i32>) {
        let launcher = ShellLauncher::new();
        let SpawnedProcess { mut child, mut output } = launcher.spawn(command_line).await.unwrap();

        let mut bytes = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), output.read_to_end(&mut bytes))
            .await
            .unwrap()
            .unwrap();
        let code = child.wait().await.unwrap();
        (bytes, code)
    }

    #[tokio::test]
    async fn test_echo_output_and_exit_code() {
        let (bytes, code) = run_to_end("echo hello").await;

        assert_eq!(bytes, b"hello\n");
        assert_eq!(code, Some(0));
    }

    #[tokio::test]
    async fn test_stderr_is_merged_into_stream() {
        let (bytes, code) = run_to_end("echo out; echo err 1>&2; exit 3").await;

        assert_eq!(String::from_utf8_lossy(&bytes), "out\nerr\n");
        assert_eq!(code, Some(3));
    }

    #[tokio::test]
    async fn test_missing_interpreter_fails_to_spawn() {
        let launcher = ShellLauncher::with_shell("/nonexistent/shell");
        let result = launcher.spawn("echo hi").await;

        assert!(matches!(result, Err(LaunchError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_kill_terminates_process_group() {
        let launcher = ShellLauncher::new();
        let SpawnedProcess { mut child, mut output } =
            launcher.spawn("sleep 30 & sleep 30; echo never").await.unwrap();

        child.kill().unwrap();

        let mut bytes = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), output.read_to_end(&mut bytes))
            .await
            .expect("stream should close once the group is killed")
            .unwrap();
        let code = child.wait().await.unwrap();

        assert!(bytes.is_empty());
        assert_eq!(code, None);
    }
}

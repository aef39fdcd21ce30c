// Process Launcher Port
// Abstraction for spawning a shell command with merged stdout/stderr

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Read end of the child's combined stdout + stderr
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Handle to a running child process.
///
/// Owned by exactly one collector task, which is the only caller of `wait`.
#[async_trait]
pub trait ChildProcess: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit and return its exit code (None if killed by a signal)
    async fn wait(&mut self) -> std::io::Result<Option<i32>>;

    /// Forcibly terminate the process (and anything it spawned, where the platform allows)
    fn kill(&mut self) -> std::io::Result<()>;
}

/// A freshly spawned child and its output stream
pub struct SpawnedProcess {
    pub child: Box<dyn ChildProcess>,
    pub output: OutputStream,
}

impl std::fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

/// Process Launcher trait
///
/// Implementations:
/// - ShellLauncher (infra-system): `/bin/sh -c` / `cmd.exe /C`
/// - MockProcessLauncher: scripted children for tests
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `command_line` through the platform command interpreter
    ///
    /// # Errors
    /// - LaunchError::SpawnFailed if the interpreter cannot be started
    /// - LaunchError::IoError if the output pipe cannot be created
    async fn spawn(&self, command_line: &str) -> Result<SpawnedProcess, LaunchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::io::DuplexStream;
    use tokio::sync::watch;

    /// Mock launcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Emit the bytes, close the stream, exit with the code
        Output { bytes: Vec<u8>, exit_code: i32 },
        /// Always fail to spawn
        Fail(String),
        /// Keep the stream open until killed
        Hang,
        /// Hand the write end to the test (see `take_writer`), exit 0 on EOF
        Pipe,
        /// Ignore kill: stream never closes, process never exits
        Unkillable,
    }

    enum MockExit {
        Immediate(i32),
        UntilKilled,
        Never,
    }

    /// Scripted child process
    pub struct MockChild {
        exit: MockExit,
        writer: Option<DuplexStream>,
        killed: watch::Sender<bool>,
        kill_count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChildProcess for MockChild {
        fn id(&self) -> Option<u32> {
            None
        }

        async fn wait(&mut self) -> std::io::Result<Option<i32>> {
            match self.exit {
                MockExit::Immediate(code) => Ok(Some(code)),
                MockExit::UntilKilled => {
                    let mut rx = self.killed.subscribe();
                    let _ = rx.wait_for(|killed| *killed).await;
                    Ok(None)
                }
                MockExit::Never => std::future::pending().await,
            }
        }

        fn kill(&mut self) -> std::io::Result<()> {
            self.kill_count.fetch_add(1, Ordering::SeqCst);
            if !matches!(self.exit, MockExit::Never) {
                self.writer = None;
                self.killed.send_replace(true);
            }
            Ok(())
        }
    }

    /// Mock Process Launcher for testing
    pub struct MockProcessLauncher {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
        kill_count: Arc<AtomicUsize>,
        writers: Arc<Mutex<Vec<DuplexStream>>>,
    }

    impl MockProcessLauncher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
                kill_count: Arc::new(AtomicUsize::new(0)),
                writers: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_output(bytes: impl Into<Vec<u8>>, exit_code: i32) -> Self {
            Self::new(MockBehavior::Output {
                bytes: bytes.into(),
                exit_code,
            })
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }
        pub fn new_hang() -> Self {
            Self::new(MockBehavior::Hang)
        }
        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }
        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
        pub fn kill_count(&self) -> usize {
            self.kill_count.load(Ordering::SeqCst)
        }
        /// Write end of the oldest `Pipe` child not yet taken
        pub fn take_writer(&self) -> Option<DuplexStream> {
            let mut writers = self.writers.lock().unwrap();
            if writers.is_empty() {
                None
            } else {
                Some(writers.remove(0))
            }
        }

        fn child(&self, exit: MockExit, writer: Option<DuplexStream>) -> Box<dyn ChildProcess> {
            let (killed, _) = watch::channel(false);
            Box::new(MockChild {
                exit,
                writer,
                killed,
                kill_count: self.kill_count.clone(),
            })
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn spawn(&self, _command_line: &str) -> Result<SpawnedProcess, LaunchError> {
            *self.call_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Output { bytes, exit_code } => Ok(SpawnedProcess {
                    child: self.child(MockExit::Immediate(exit_code), None),
                    output: Box::new(std::io::Cursor::new(bytes)),
                }),
                MockBehavior::Fail(msg) => Err(LaunchError::SpawnFailed(msg)),
                MockBehavior::Hang => {
                    let (reader, writer) = tokio::io::duplex(1024);
                    Ok(SpawnedProcess {
                        child: self.child(MockExit::UntilKilled, Some(writer)),
                        output: Box::new(reader),
                    })
                }
                MockBehavior::Pipe => {
                    let (reader, writer) = tokio::io::duplex(64 * 1024);
                    self.writers.lock().unwrap().push(writer);
                    Ok(SpawnedProcess {
                        child: self.child(MockExit::Immediate(0), None),
                        output: Box::new(reader),
                    })
                }
                MockBehavior::Unkillable => {
                    let (reader, writer) = tokio::io::duplex(1024);
                    Ok(SpawnedProcess {
                        child: self.child(MockExit::Never, Some(writer)),
                        output: Box::new(reader),
                    })
                }
            }
        }
    }
}

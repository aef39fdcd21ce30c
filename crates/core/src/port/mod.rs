// Port Layer - Interfaces for external dependencies

pub mod process_launcher;

// Re-exports
pub use process_launcher::mocks;
pub use process_launcher::{ChildProcess, LaunchError, OutputStream, ProcessLauncher, SpawnedProcess};

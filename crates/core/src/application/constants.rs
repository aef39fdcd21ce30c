// Manager constants (ADR: No magic values)
use std::time::Duration;

/// Maximum number of concurrently tracked commands
pub const DEFAULT_MAX_COMMANDS: usize = 100;

/// Longest accepted command line in bytes
pub const DEFAULT_MAX_COMMAND_BYTES: usize = 1023;

/// Bytes reserved for a new command's output buffer (64 KiB)
pub const DEFAULT_INITIAL_BUFFER_CAPACITY: usize = 64 * 1024;

/// Size of a single collector read (4 KiB)
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// How long Stop waits for the collector to exit (5 seconds)
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// First id handed out by a fresh table
pub const FIRST_COMMAND_ID: i64 = 1;

// Remex Core - Command Execution Manager & Ports
// NO process/RPC dependencies (Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{CommandManager, ManagerConfig, ManagerStats, StopOutcome};
pub use domain::{CommandId, CommandSnapshot, CommandState};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

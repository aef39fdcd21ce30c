// Application Layer - Command table, collectors and the manager facade

pub mod collector;
pub mod command_table;
pub mod config;
pub mod constants;
pub mod manager;
mod stop_signal;

// Re-exports
pub use collector::CollectorExit;
pub use command_table::{CommandTable, TrackedCommand};
pub use config::ManagerConfig;
pub use manager::{CommandManager, ManagerStats, StopOutcome};
pub use stop_signal::{stop_channel, StopSender, StopToken};

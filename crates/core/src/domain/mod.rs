// Domain Layer - Commands and their output buffers

pub mod command;
pub mod error;
pub mod output_buffer;

// Re-exports
pub use command::{Command, CommandId, CommandSnapshot, CommandState};
pub use error::DomainError;
pub use output_buffer::OutputBuffer;

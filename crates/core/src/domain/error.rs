// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid command state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Command {0} has been released")]
    Released(i64),
}

pub type Result<T> = std::result::Result<T, DomainError>;

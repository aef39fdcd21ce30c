// Central Error Type for the Manager Facade

use crate::domain::CommandId;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Command table full ({capacity} slots in use)")]
    ResourceExhausted { capacity: usize },

    #[error("Launch error: {0}")]
    Launch(#[from] crate::port::LaunchError),

    #[error("Command {0} not found")]
    NotFound(CommandId),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// True for failures that the transport collapses into the launch sentinel
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::ResourceExhausted { .. } | AppError::Launch(_)
        )
    }
}

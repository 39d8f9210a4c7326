//! Environment access error types.

use crate::errors::PreserveEnvError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("Failed to allocate {bytes} bytes for a copy of an environment entry")]
    AllocationFailure { bytes: usize },

    #[error("Name {name} too long to stash ({len} bytes, limit {limit})")]
    NameTooLong {
        name: String,
        len: usize,
        limit: usize,
    },

    #[error("Invalid environment variable name '{name}'")]
    InvalidName { name: String },

    #[error("Failed to set {name}: {message}")]
    SetFailed { name: String, message: String },

    #[error("Failed to get job environment: {message}")]
    GetFailed { message: String },
}

impl PreserveEnvError for EnvError {
    fn error_code(&self) -> &'static str {
        match self {
            EnvError::AllocationFailure { .. } => "ENV_ALLOCATION_FAILURE",
            EnvError::NameTooLong { .. } => "ENV_NAME_TOO_LONG",
            EnvError::InvalidName { .. } => "ENV_INVALID_NAME",
            EnvError::SetFailed { .. } => "ENV_SET_FAILED",
            EnvError::GetFailed { .. } => "ENV_GET_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            EnvError::NameTooLong { .. } | EnvError::InvalidName { .. }
        )
    }
}

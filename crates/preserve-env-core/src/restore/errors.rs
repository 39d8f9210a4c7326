//! Restore error types.

use std::fmt;

use crate::env::EnvError;
use crate::errors::PreserveEnvError;

/// Which of the two restore passes was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePass {
    Unset,
    Restore,
}

impl fmt::Display for RestorePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestorePass::Unset => write!(f, "unset"),
            RestorePass::Restore => write!(f, "restore"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("Failed to get job environment during {pass} pass: {source}")]
    JobEnvUnavailable {
        pass: RestorePass,
        #[source]
        source: EnvError,
    },
}

impl PreserveEnvError for RestoreError {
    fn error_code(&self) -> &'static str {
        match self {
            RestoreError::JobEnvUnavailable { .. } => "RESTORE_JOB_ENV_UNAVAILABLE",
        }
    }
}

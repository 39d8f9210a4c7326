use serde::Serialize;

use crate::env::EnvError;
use crate::errors::PreserveEnvError;

/// A variable a phase could not handle, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedVar {
    pub name: String,
    pub code: &'static str,
    pub reason: String,
}

impl SkippedVar {
    pub fn new(name: &str, error: &EnvError) -> Self {
        Self {
            name: name.to_string(),
            code: error.error_code(),
            reason: error.to_string(),
        }
    }
}

/// Outcome of one capture pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureSummary {
    /// Original names now stashed, in environment order.
    pub preserved: Vec<String>,
    pub skipped: Vec<SkippedVar>,
}

impl CaptureSummary {
    /// True when every selected variable was stashed.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn skip(&mut self, name: &str, error: &EnvError) {
        self.skipped.push(SkippedVar::new(name, error));
    }
}

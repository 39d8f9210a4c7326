use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Namespace captured locally and restored remotely.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "SLURM_";

/// Sub-prefixes of the namespace that are regenerated downstream and must
/// never be frozen. Matched as plain prefixes, so `SLURM_PRIO` also covers
/// `SLURM_PRIORITY` and anything else starting with those characters.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["SLURM_RLIMIT", "SLURM_UMASK", "SLURM_PRIO"];

/// Namespaces wiped from the job environment before stashes are restored.
/// `MPIRUN_` is set by the remote task launcher for its own job control.
pub const DEFAULT_CLEAR_PREFIXES: &[&str] = &["SLURM_", "MPIRUN_"];

pub const DEFAULT_STASH_PREFIX: &str = "save_";

/// Longest stash name (in bytes) accepted by capture.
pub const DEFAULT_MAX_STASH_NAME_LEN: usize = 1022;

/// Naming rules for the capture/restore protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreserveConfig {
    pub namespace_prefix: String,
    pub excluded_prefixes: Vec<String>,
    pub clear_prefixes: Vec<String>,
    pub stash_prefix: String,
    pub max_stash_name_len: usize,
}

impl Default for PreserveConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            excluded_prefixes: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            clear_prefixes: DEFAULT_CLEAR_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            stash_prefix: DEFAULT_STASH_PREFIX.to_string(),
            max_stash_name_len: DEFAULT_MAX_STASH_NAME_LEN,
        }
    }
}

impl PreserveConfig {
    /// Prefix selecting stashed entries on the remote side (`save_SLURM_`).
    pub fn restore_prefix(&self) -> String {
        format!("{}{}", self.stash_prefix, self.namespace_prefix)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace_prefix.is_empty() {
            return Err(invalid("namespace_prefix must not be empty"));
        }

        if self.stash_prefix.is_empty() {
            return Err(invalid("stash_prefix must not be empty"));
        }

        // A stash inside the namespace would be stashed again on the next capture.
        if self.stash_prefix.starts_with(&self.namespace_prefix) {
            return Err(invalid(&format!(
                "stash_prefix '{}' must not start with namespace_prefix '{}'",
                self.stash_prefix, self.namespace_prefix
            )));
        }

        if self.stash_prefix.contains('=') || self.namespace_prefix.contains('=') {
            return Err(invalid("prefixes must not contain '='"));
        }

        if let Some(excluded) = self
            .excluded_prefixes
            .iter()
            .find(|p| !p.starts_with(&self.namespace_prefix))
        {
            return Err(invalid(&format!(
                "excluded prefix '{}' is outside namespace '{}'",
                excluded, self.namespace_prefix
            )));
        }

        if self.clear_prefixes.is_empty() || self.clear_prefixes.iter().any(|p| p.is_empty()) {
            return Err(invalid("clear_prefixes must list at least one non-empty prefix"));
        }

        if self.max_stash_name_len <= self.restore_prefix().len() {
            return Err(invalid(&format!(
                "max_stash_name_len {} leaves no room for a variable name",
                self.max_stash_name_len
            )));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.to_string(),
    }
}

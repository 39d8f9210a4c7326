//! Selection predicates and the stash name mapping.

use preserve_env_config::PreserveConfig;

use crate::env::{EnvError, copy_str};

/// Naming rules shared by capture and restore.
///
/// All matching is plain byte-prefix matching on variable names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
    excluded: Vec<String>,
    clear: Vec<String>,
    stash_prefix: String,
    restore_prefix: String,
    max_stash_name_len: usize,
}

impl Namespace {
    pub fn from_config(config: &PreserveConfig) -> Self {
        Self {
            prefix: config.namespace_prefix.clone(),
            excluded: config.excluded_prefixes.clone(),
            clear: config.clear_prefixes.clone(),
            stash_prefix: config.stash_prefix.clone(),
            restore_prefix: config.restore_prefix(),
            max_stash_name_len: config.max_stash_name_len,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn stash_prefix(&self) -> &str {
        &self.stash_prefix
    }

    pub fn restore_prefix(&self) -> &str {
        &self.restore_prefix
    }

    pub fn max_stash_name_len(&self) -> usize {
        self.max_stash_name_len
    }

    /// Capture selection: inside the namespace and not under any exclusion.
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && !self.excluded.iter().any(|e| name.starts_with(e))
    }

    /// Restore pass 1 selection. Broader than [`Self::matches`]: no
    /// exclusions, and every clear prefix counts.
    pub fn should_clear(&self, name: &str) -> bool {
        self.clear.iter().any(|p| name.starts_with(p))
    }

    /// Restore pass 2 selection. Exclusions are deliberately not consulted.
    pub fn is_stashed(&self, name: &str) -> bool {
        name.starts_with(&self.restore_prefix)
    }

    /// `save_` + `name`, or `NameTooLong` when the result exceeds the limit.
    pub fn stash(&self, name: &str) -> Result<String, EnvError> {
        let len = self.stash_prefix.len() + name.len();
        if len > self.max_stash_name_len {
            return Err(EnvError::NameTooLong {
                name: name.to_string(),
                len,
                limit: self.max_stash_name_len,
            });
        }

        let mut stashed = copy_str(&self.stash_prefix)?;
        stashed
            .try_reserve_exact(name.len())
            .map_err(|_| EnvError::AllocationFailure { bytes: len })?;
        stashed.push_str(name);
        Ok(stashed)
    }

    /// Inverse of [`Self::stash`]; `None` when `stashed` carries no stash prefix.
    pub fn unstash<'a>(&self, stashed: &'a str) -> Option<&'a str> {
        stashed.strip_prefix(self.stash_prefix.as_str())
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::from_config(&PreserveConfig::default())
    }
}

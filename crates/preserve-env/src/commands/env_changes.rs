use std::ffi::OsStr;
use std::process::Command;

use preserve_env_core::MemoryEnv;

/// Difference between the inherited environment and the one a phase produced.
///
/// Applied on top of the inherited environment, so variables the phase never
/// looked at (including non-UTF-8 ones) pass through byte for byte.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct EnvChanges {
    pub removed: Vec<String>,
    pub set: Vec<(String, String)>,
}

impl EnvChanges {
    pub fn between(before: &MemoryEnv, after: &MemoryEnv) -> Self {
        let removed = before
            .iter()
            .filter(|(name, _)| !after.contains(name))
            .map(|(name, _)| name.to_string())
            .collect();
        let set = after
            .iter()
            .filter(|(name, value)| before.get(name) != Some(*value))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self { removed, set }
    }

    /// Whether `name` is removed or overridden.
    pub fn touches(&self, name: &OsStr) -> bool {
        name.to_str().is_some_and(|name| {
            self.removed.iter().any(|n| n == name) || self.set.iter().any(|(n, _)| n == name)
        })
    }

    pub fn apply_to(&self, command: &mut Command) {
        for name in &self.removed {
            command.env_remove(name);
        }
        for (name, value) in &self.set {
            command.env(name, value);
        }
    }
}

//! Ordered in-memory environment.

use super::entry::{split_entry, validate_name};
use super::errors::EnvError;
use super::traits::{JobEnvironment, LocalEnvironment};

/// An ordered `name=value` store that stands in for either side of the protocol.
///
/// New names are appended; overwriting keeps the original position, so
/// snapshots are stable across value updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: Vec<(String, String)>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `name=value` entries. Later duplicates overwrite earlier ones.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, EnvError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut env = Self::new();
        for raw in entries {
            let entry = split_entry(raw.as_ref())?;
            env.insert(entry.name, entry.value);
        }
        Ok(env)
    }

    /// Build from name/value pairs, e.g. `std::env::vars()`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = Self::new();
        for (name, value) in pairs {
            env.insert(name.into(), value.into());
        }
        env
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Name/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Names starting with `prefix`, in order.
    pub fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.vars
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(move |n| n.starts_with(prefix))
    }

    fn insert(&mut self, name: String, value: String) {
        match self.vars.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name, value)),
        }
    }

    fn store(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError> {
        validate_name(name)?;
        if value.contains('\0') {
            return Err(EnvError::SetFailed {
                name: name.to_string(),
                message: "value contains a NUL byte".to_string(),
            });
        }
        if !overwrite && self.contains(name) {
            return Ok(());
        }
        self.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, name: &str) {
        self.vars.retain(|(n, _)| n != name);
    }
}

impl LocalEnvironment for MemoryEnv {
    fn entries(&self) -> Vec<String> {
        self.vars.iter().map(|(n, v)| format!("{}={}", n, v)).collect()
    }

    fn define(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError> {
        self.store(name, value, overwrite)
    }
}

impl JobEnvironment for MemoryEnv {
    fn get(&self) -> Result<Vec<String>, EnvError> {
        Ok(self.entries())
    }

    fn set(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError> {
        self.store(name, value, overwrite)
    }

    fn unset(&mut self, name: &str) {
        self.remove(name);
    }
}

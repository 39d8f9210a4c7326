//! Environment accessor traits.

use super::errors::EnvError;

/// The invoking process's own environment, as seen by capture.
pub trait LocalEnvironment {
    /// Snapshot of every entry as raw `name=value` strings, in environment order.
    fn entries(&self) -> Vec<String>;

    /// Set `name=value`. With `overwrite == false` an existing value is kept
    /// and the call still succeeds.
    fn define(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError>;
}

/// The environment a host associates with a remote task.
pub trait JobEnvironment {
    /// Fresh snapshot reflecting every earlier `set`/`unset`.
    fn get(&self) -> Result<Vec<String>, EnvError>;

    fn set(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError>;

    /// Best-effort removal; removing an absent name is not an error.
    fn unset(&mut self, name: &str);
}

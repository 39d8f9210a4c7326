//! The current process environment.

use std::ffi::OsStr;

use tracing::warn;

use super::entry::validate_name;
use super::errors::EnvError;
use super::traits::LocalEnvironment;

/// [`LocalEnvironment`] backed by `std::env`.
///
/// Entries whose name or value is not valid UTF-8 are left out of snapshots;
/// they can never be in the namespace anyway once a prefix has to match.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        Self
    }
}

impl LocalEnvironment for ProcessEnv {
    fn entries(&self) -> Vec<String> {
        std::env::vars_os()
            .filter_map(|(name, value)| match raw_entry(&name, &value) {
                Ok(raw) => Some(raw),
                Err(lossy_name) => {
                    warn!(
                        event = "core.env.non_utf8_entry_skipped",
                        name = %lossy_name,
                    );
                    None
                }
            })
            .collect()
    }

    fn define(&mut self, name: &str, value: &str, overwrite: bool) -> Result<(), EnvError> {
        validate_name(name)?;
        if value.contains('\0') {
            return Err(EnvError::SetFailed {
                name: name.to_string(),
                message: "value contains a NUL byte".to_string(),
            });
        }
        if !overwrite && std::env::var_os(name).is_some() {
            return Ok(());
        }
        // SAFETY: Capture runs during option parsing, before the host spawns
        // any threads that read the environment.
        unsafe { std::env::set_var(name, value) };
        Ok(())
    }
}

/// `name=value` when both halves are UTF-8, otherwise the lossy name for reporting.
fn raw_entry(name: &OsStr, value: &OsStr) -> Result<String, String> {
    match (name.to_str(), value.to_str()) {
        (Some(name), Some(value)) => Ok(format!("{}={}", name, value)),
        _ => Err(name.to_string_lossy().into_owned()),
    }
}

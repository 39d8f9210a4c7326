//! Raw `name=value` entry handling.

use serde::Serialize;

use super::errors::EnvError;

/// An owned `name=value` pair split out of a raw environment entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvEntry {
    pub name: String,
    pub value: String,
}

impl EnvEntry {
    /// Reassemble the raw `name=value` form.
    pub fn to_raw(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Name part of a raw entry without copying. The whole string when there is no `=`.
pub fn entry_name(raw: &str) -> &str {
    raw.split_once('=').map_or(raw, |(name, _)| name)
}

/// Split `raw` at its first `=` into independently owned name and value.
///
/// Any input is accepted: with no `=` the whole string is the name and the
/// value is empty. Only allocation failure is reported.
pub fn split_entry(raw: &str) -> Result<EnvEntry, EnvError> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
    Ok(EnvEntry {
        name: copy_str(name)?,
        value: copy_str(value)?,
    })
}

/// Copy `s` into a fresh allocation, reporting failure instead of aborting.
pub fn copy_str(s: &str) -> Result<String, EnvError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())
        .map_err(|_| EnvError::AllocationFailure { bytes: s.len() })?;
    out.push_str(s);
    Ok(out)
}

/// Names accepted by `setenv(3)`: non-empty, no `=`, no NUL.
pub fn validate_name(name: &str) -> Result<(), EnvError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(EnvError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

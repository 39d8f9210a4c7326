//! Owned worklist filled by a scan and consumed by the mutation that follows.

use crate::env::{EnvError, copy_str};

/// Raw `name=value` copies collected during a scan.
///
/// Every phase fills a `PendingList` completely from a snapshot before it
/// touches the environment, then drains it. The list owns its strings, so
/// it stays valid however the environment changes underneath.
#[derive(Debug, Default)]
pub struct PendingList {
    entries: Vec<String>,
}

impl PendingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an independent copy of `raw`.
    pub fn push(&mut self, raw: &str) -> Result<(), EnvError> {
        let copy = copy_str(raw)?;
        self.entries
            .try_reserve(1)
            .map_err(|_| EnvError::AllocationFailure {
                bytes: std::mem::size_of::<String>(),
            })?;
        self.entries.push(copy);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the list, yielding entries in scan order.
    pub fn drain(self) -> impl Iterator<Item = String> {
        self.entries.into_iter()
    }
}

//! Environment representations the protocol runs against.
//!
//! Capture talks to a [`LocalEnvironment`] (the invoking process), restore
//! talks to a [`JobEnvironment`] (the environment the host hands to a remote
//! task). Both only ever hand out owned snapshots, so nothing can be mutated
//! while a scan of it is in progress.

pub mod entry;
pub mod errors;
pub mod memory;
pub mod process;
pub mod traits;

pub use entry::{EnvEntry, copy_str, entry_name, split_entry, validate_name};
pub use errors::EnvError;
pub use memory::MemoryEnv;
pub use process::ProcessEnv;
pub use traits::{JobEnvironment, LocalEnvironment};

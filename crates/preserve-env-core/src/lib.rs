pub mod capture;
pub mod env;
pub mod errors;
pub mod logging;
pub mod namespace;
pub mod pending;
pub mod restore;
pub mod trigger;

pub use capture::{CaptureSummary, SkippedVar, capture};
pub use env::{EnvEntry, EnvError, JobEnvironment, LocalEnvironment, MemoryEnv, ProcessEnv};
pub use errors::{PreserveEnvError, PreserveResult};
pub use logging::init_logging;
pub use namespace::Namespace;
pub use pending::PendingList;
pub use preserve_env_config::{ConfigError, PreserveConfig, load_config};
pub use restore::{RestoreError, RestorePass, RestoreSummary, restore};
pub use trigger::{ArgPolicy, ExecutionContext, OptionSpec, PRESERVE_OPTION, TriggerState};

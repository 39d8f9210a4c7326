//! Configuration for the preserve-env capture/restore protocol.
//!
//! Defaults reproduce the SLURM namespace rules exactly; a TOML file can
//! override them for sites that forward a differently named namespace.

mod errors;
mod loading;
mod types;

pub use errors::ConfigError;
pub use loading::{CONFIG_ENV_VAR, default_config_path, load_config, load_config_from_str};
pub use types::{
    DEFAULT_CLEAR_PREFIXES, DEFAULT_EXCLUDED_PREFIXES, DEFAULT_MAX_STASH_NAME_LEN,
    DEFAULT_NAMESPACE_PREFIX, DEFAULT_STASH_PREFIX, PreserveConfig,
};

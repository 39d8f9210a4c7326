use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::types::PreserveConfig;

/// Overrides the config file location when non-empty.
pub const CONFIG_ENV_VAR: &str = "PRESERVE_ENV_CONFIG";

/// `~/.preserve-env/config.toml`, or `None` when HOME cannot be resolved.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".preserve-env").join("config.toml"))
}

/// Load and validate the configuration.
///
/// Resolution order: `path`, then `$PRESERVE_ENV_CONFIG`, then the default
/// path. An explicitly named file must exist; a missing default file yields
/// the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<PreserveConfig, ConfigError> {
    let explicit = path.map(Path::to_path_buf).or_else(|| {
        std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });

    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
            read_config_file(&path)?
        }
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => read_config_file(&path)?,
            None => {
                debug!(event = "config.load_defaults", reason = "no config file");
                PreserveConfig::default()
            }
        },
    };

    config.validate()?;
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn load_config_from_str(contents: &str) -> Result<PreserveConfig, ConfigError> {
    let config: PreserveConfig =
        toml::from_str(contents).map_err(|e| ConfigError::ConfigParseError {
            message: e.to_string(),
        })?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<PreserveConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PreserveConfig =
        toml::from_str(&contents).map_err(|e| ConfigError::ConfigParseError {
            message: format!("{}: {}", path.display(), e),
        })?;

    info!(event = "config.load_completed", path = %path.display());
    Ok(config)
}

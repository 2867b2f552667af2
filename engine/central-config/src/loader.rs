use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::defaults::DEFAULT_CONFIG;
use crate::structs::CentralConfig;

/// Explicit config file path, checked before the search paths.
pub const CONFIG_ENV_VAR: &str = "PONDER_CONFIG";

/// Locations probed in order when `PONDER_CONFIG` is unset.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["ponder.toml", "config/ponder.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Overrides one field from a `PONDER_<SECTION>_<KEY>` environment
/// variable when it is set and parses.
macro_rules! env_override {
    ($field:expr, $var:literal) => {
        if let Ok(raw) = std::env::var($var) {
            match raw.parse() {
                Ok(value) => $field = value,
                Err(_) => warn!(var = $var, value = %raw, "ignoring unparseable env override"),
            }
        }
    };
}

/// Loads the configuration: built-in defaults, then the first config
/// file found, then environment overrides. A broken file logs a
/// warning and falls back to the defaults rather than failing.
pub fn load_config() -> CentralConfig {
    let mut config = match find_config_file() {
        Some(path) => match read_config_file(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                warn!(error = %e, "falling back to built-in defaults");
                DEFAULT_CONFIG.clone()
            }
        },
        None => DEFAULT_CONFIG.clone(),
    };
    apply_env_overrides(&mut config);
    config
}

fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    CONFIG_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

pub fn read_config_file(path: &Path) -> Result<CentralConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(config: &mut CentralConfig) {
    env_override!(config.search.exploration_constant, "PONDER_SEARCH_EXPLORATION_CONSTANT");
    env_override!(config.search.simulations, "PONDER_SEARCH_SIMULATIONS");
    env_override!(config.search.batch_size, "PONDER_SEARCH_BATCH_SIZE");
    env_override!(config.driver.speed, "PONDER_DRIVER_SPEED");
    env_override!(config.logging.level, "PONDER_LOGGING_LEVEL");
    if let Ok(raw) = std::env::var("PONDER_DRIVER_SEED") {
        match raw.parse() {
            Ok(seed) => config.driver.seed = Some(seed),
            Err(_) => warn!(value = %raw, "ignoring unparseable PONDER_DRIVER_SEED"),
        }
    }
}

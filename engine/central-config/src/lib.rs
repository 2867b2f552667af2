//! Layered configuration for the search binaries.
//!
//! Values resolve in order: built-in defaults, then an optional TOML
//! file (`PONDER_CONFIG` or one of the search paths), then `PONDER_*`
//! environment variables.

mod defaults;
mod loader;
mod structs;

pub use defaults::{DEFAULT_CONFIG, DEFAULT_CONFIG_TOML};
pub use loader::{load_config, read_config_file, ConfigError, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS};
pub use structs::{CentralConfig, DriverSection, LoggingSection, SearchSection};

use once_cell::sync::Lazy;

use crate::structs::CentralConfig;

/// Baseline TOML compiled into the binary so a missing config file is
/// never fatal.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

pub static DEFAULT_CONFIG: Lazy<CentralConfig> = Lazy::new(|| {
    toml::from_str(DEFAULT_CONFIG_TOML)
        .unwrap_or_else(|e| panic!("built-in default config is invalid: {e}"))
});

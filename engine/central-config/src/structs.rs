use serde::Deserialize;

/// Top-level configuration shared by every binary.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CentralConfig {
    pub search: SearchSection,
    pub driver: DriverSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSection {
    pub exploration_constant: f64,
    pub simulations: u32,
    pub batch_size: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverSection {
    /// Pacing between batches, 0 (slowest) to 100 (no pause).
    pub speed: u8,
    /// Fixed RNG seed for reproducible runs, random when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for CentralConfig {
    fn default() -> Self {
        Self {
            search: SearchSection::default(),
            driver: DriverSection::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            exploration_constant: 1.4,
            simulations: 200,
            batch_size: 20,
        }
    }
}

impl Default for DriverSection {
    fn default() -> Self {
        Self { speed: 100, seed: None }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

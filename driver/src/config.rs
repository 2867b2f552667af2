use std::time::Duration;

use mcts::SearchConfig;

/// Pacing and reproducibility knobs for a scheduled search.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub search: SearchConfig,
    /// 0 (slowest) to 100 (fastest). Values above 100 are treated
    /// as 100.
    pub speed: u8,
    /// Fixed RNG seed; a random seed is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            speed: 100,
            seed: None,
        }
    }
}

impl DriverConfig {
    /// Pause between batches. Speed 100 still yields to the runtime
    /// for at least a millisecond so progress events drain.
    pub fn batch_delay(&self) -> Duration {
        let speed = u64::from(self.speed.min(100));
        Duration::from_millis(((100 - speed) * 4).max(1))
    }

    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

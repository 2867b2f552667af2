//! Search tuning knobs.

/// Hard ceiling on the simulation budget of a single search.
pub const MAX_SIMULATIONS: u32 = 500;

/// Configuration for a single search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// UCB1 exploration constant. Higher values favour less-visited
    /// children over children with good running averages.
    pub exploration_constant: f64,
    /// Total simulation budget for the search, clamped to
    /// [`MAX_SIMULATIONS`].
    pub simulations: u32,
    /// Simulations executed per `run_batch` call.
    pub batch_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: 1.4,
            simulations: 200,
            batch_size: 20,
        }
    }
}

impl SearchConfig {
    /// Small budget for fast unit tests.
    pub fn for_testing() -> Self {
        Self {
            simulations: 50,
            ..Self::default()
        }
    }

    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    pub fn with_simulations(mut self, simulations: u32) -> Self {
        self.simulations = simulations.min(MAX_SIMULATIONS);
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_budget_is_clamped() {
        let config = SearchConfig::default().with_simulations(10_000);
        assert_eq!(config.simulations, MAX_SIMULATIONS);
    }

    #[test]
    fn batch_size_has_a_floor_of_one() {
        let config = SearchConfig::default().with_batch_size(0);
        assert_eq!(config.batch_size, 1);
    }
}

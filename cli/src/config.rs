use anyhow::bail;
use central_config::{load_config, CentralConfig};
use clap::{Parser, ValueEnum};
use once_cell::sync::Lazy;

use driver::DriverConfig;
use mcts::{SearchConfig, MAX_SIMULATIONS};

/// Central config resolved once; CLI flags default to its values.
static CENTRAL: Lazy<CentralConfig> = Lazy::new(load_config);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Game {
    Tictactoe,
    Connect4,
}

/// Watch the engine play a game against itself.
#[derive(Debug, Parser)]
#[command(name = "ponder", version)]
pub struct Config {
    /// Game to play.
    #[arg(long, value_enum, default_value_t = Game::Tictactoe)]
    pub game: Game,

    /// Number of self-play games.
    #[arg(long, default_value_t = 1)]
    pub games: u32,

    /// Simulation budget per move.
    #[arg(long, default_value_t = CENTRAL.search.simulations)]
    pub simulations: u32,

    /// Simulations per scheduling batch.
    #[arg(long, default_value_t = CENTRAL.search.batch_size)]
    pub batch_size: u32,

    /// UCB1 exploration constant.
    #[arg(long, default_value_t = CENTRAL.search.exploration_constant)]
    pub exploration: f64,

    /// Pacing, 0 (slowest) to 100 (fastest).
    #[arg(long, default_value_t = CENTRAL.driver.speed)]
    pub speed: u8,

    /// Fixed RNG seed for reproducible games.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log filter, e.g. "info" or "mcts=trace".
    #[arg(long, default_value_t = CENTRAL.logging.level.clone())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.games == 0 {
            bail!("--games must be at least 1");
        }
        if self.simulations == 0 {
            bail!("--simulations must be at least 1");
        }
        if self.simulations > MAX_SIMULATIONS {
            bail!("--simulations must not exceed {MAX_SIMULATIONS}");
        }
        if self.batch_size == 0 {
            bail!("--batch-size must be at least 1");
        }
        if self.speed > 100 {
            bail!("--speed must be between 0 and 100");
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            bail!("--exploration must be a non-negative number");
        }
        Ok(())
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            search: SearchConfig::default()
                .with_simulations(self.simulations)
                .with_batch_size(self.batch_size)
                .with_exploration_constant(self.exploration),
            speed: self.speed,
            seed: self.seed.or(CENTRAL.driver.seed),
        }
    }
}

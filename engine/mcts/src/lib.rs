//! Monte Carlo tree search with UCB1 selection.
//!
//! The search runs in batches so callers can interleave simulation
//! work with progress reporting and cancellation. A typical driver
//! loop:
//!
//! ```
//! use game_core::{GameRules, Player};
//! use games_tictactoe::TicTacToe;
//! use mcts::{MctsSearch, SearchConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(7);
//! let rules = TicTacToe;
//! let board = rules.new_board();
//! let mut search = MctsSearch::new(rules, board, Player::A, SearchConfig::default()).unwrap();
//! while !search.is_finished() {
//!     search.run_batch(&mut rng).unwrap();
//! }
//! let mv = search.best_move().unwrap();
//! assert!(mv < 9);
//! ```

mod config;
mod node;
mod search;
mod tree;

pub use config::{SearchConfig, MAX_SIMULATIONS};
pub use node::{NodeId, SearchNode};
pub use search::{run_search, MctsSearch, SearchError, SearchProgress};
pub use tree::{SearchTree, TreeError, TreeStats};

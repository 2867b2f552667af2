//! Runs searches in paced batches on the tokio runtime.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use game_core::{Board, GameRules, Player};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use mcts::{MctsSearch, SearchProgress, TreeStats};

use crate::config::DriverConfig;

/// Events streamed to the consumer while a search runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Emitted after every batch.
    Progress(SearchProgress),
    /// Terminal event of a successful search. `degraded` marks a
    /// fallback move chosen after a mid-search fault.
    Finished {
        final_move: usize,
        stats: TreeStats,
        degraded: bool,
    },
    /// Terminal event when no move can be produced at all.
    Failed { reason: String },
}

/// Consumer side of one scheduled search.
pub struct SearchHandle {
    events: mpsc::UnboundedReceiver<SearchEvent>,
    cancelled: Arc<AtomicBool>,
}

impl SearchHandle {
    /// Next event, `None` once the search task is done.
    pub async fn recv(&mut self) -> Option<SearchEvent> {
        self.events.recv().await
    }

    /// Stops the search. The running task notices before its next
    /// batch and exits without a terminal event.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Schedules searches so that at most the latest one is live. Starting
/// a new search silently retires any previous one; the retired task
/// stops emitting and exits at its next checkpoint.
pub struct BatchScheduler {
    generation: Arc<AtomicU64>,
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchScheduler {
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawns a search over `board` and returns its event stream.
    pub fn start<G>(
        &self,
        rules: G,
        board: Board,
        player_to_move: Player,
        config: DriverConfig,
    ) -> SearchHandle
    where
        G: GameRules + Send + 'static,
    {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let live = Arc::clone(&self.generation);
        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::unbounded_channel();

        let task_cancelled = Arc::clone(&cancelled);
        tokio::spawn(async move {
            run_search_task(rules, board, player_to_move, config, tx, move || {
                task_cancelled.load(Ordering::SeqCst)
                    || live.load(Ordering::SeqCst) != my_generation
            })
            .await;
        });

        SearchHandle { events: rx, cancelled }
    }
}

async fn run_search_task<G: GameRules>(
    rules: G,
    board: Board,
    player_to_move: Player,
    config: DriverConfig,
    tx: mpsc::UnboundedSender<SearchEvent>,
    retired: impl Fn() -> bool,
) {
    let mut rng = match config.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let mut search = match MctsSearch::new(rules, board, player_to_move, config.search.clone()) {
        Ok(search) => search,
        Err(e) => {
            let _ = tx.send(SearchEvent::Failed { reason: e.to_string() });
            return;
        }
    };
    if search.root_is_terminal() {
        let _ = tx.send(SearchEvent::Failed {
            reason: "position is already decided".to_string(),
        });
        return;
    }

    let delay = config.batch_delay();
    let mut degraded = false;
    while !search.is_finished() {
        if retired() {
            debug!("search retired, stopping without a terminal event");
            return;
        }
        if let Err(e) = search.run_batch(&mut rng) {
            warn!(error = %e, "batch failed, falling back to a random move");
            degraded = true;
            break;
        }
        let _ = tx.send(SearchEvent::Progress(search.progress()));
        if !search.is_finished() {
            tokio::time::sleep(delay).await;
        }
    }

    if retired() {
        return;
    }
    let event = if degraded {
        match random_fallback(&search, &mut rng) {
            Some(final_move) => SearchEvent::Finished {
                final_move,
                stats: search.stats(),
                degraded: true,
            },
            None => SearchEvent::Failed {
                reason: "no legal move available for fallback".to_string(),
            },
        }
    } else {
        match search.best_move() {
            Ok(final_move) => SearchEvent::Finished {
                final_move,
                stats: search.stats(),
                degraded: false,
            },
            Err(e) => SearchEvent::Failed { reason: e.to_string() },
        }
    };
    let _ = tx.send(event);
}

fn random_fallback<G: GameRules>(search: &MctsSearch<G>, rng: &mut impl Rng) -> Option<usize> {
    search.root_moves().choose(rng).copied()
}

//! The search loop: selection, expansion, rollout, backpropagation.

use game_core::{score_for, Board, GameRules, Player, Verdict};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::trace;

use crate::config::{SearchConfig, MAX_SIMULATIONS};
use crate::node::{NodeId, SearchNode};
use crate::tree::{SearchTree, TreeError, TreeStats};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Asked for a best move before any root child existed.
    #[error("search tree has no expanded moves to choose from")]
    EmptyTree,
    /// Expansion picked a move the tree did not consider untried.
    #[error("cannot expand illegal move {mv}")]
    IllegalExpansion { mv: usize },
    /// The starting board contradicts the game rules, either by size
    /// or by being undecided with no legal moves.
    #[error("board state is inconsistent with the game rules")]
    InconsistentBoard,
}

impl From<TreeError> for SearchError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::UntriedMoveMissing { mv, .. } => SearchError::IllegalExpansion { mv },
        }
    }
}

/// Snapshot of a search in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchProgress {
    pub completed: u32,
    pub budget: u32,
    /// Current best move, `None` until the first expansion.
    pub best_move: Option<usize>,
    /// Visit share per root move, normalised by root visits.
    pub visit_fractions: Vec<(usize, f64)>,
}

/// Incremental Monte Carlo tree search over one position.
///
/// The search owns its tree and runs in caller-sized batches, so a
/// driver can interleave simulation work with progress reporting and
/// cancellation checks.
pub struct MctsSearch<G: GameRules> {
    rules: G,
    tree: SearchTree,
    config: SearchConfig,
    completed: u32,
}

impl<G: GameRules> MctsSearch<G> {
    /// Starts a search from `board` with `player_to_move` to act.
    pub fn new(rules: G, board: Board, player_to_move: Player, config: SearchConfig) -> Result<Self, SearchError> {
        if board.len() != rules.board_cells() {
            return Err(SearchError::InconsistentBoard);
        }
        let verdict = rules.winner(&board);
        let untried = rules.legal_moves(&board);
        if verdict.is_none() && untried.is_empty() {
            return Err(SearchError::InconsistentBoard);
        }
        let mut tree = SearchTree::new(board, player_to_move, untried);
        tree.get_mut(SearchTree::ROOT).verdict = verdict;
        let config = SearchConfig {
            simulations: config.simulations.min(MAX_SIMULATIONS),
            ..config
        };
        Ok(Self { rules, tree, config, completed: 0 })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Simulations run so far.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.config.simulations
    }

    /// True when the root position is already decided.
    pub fn root_is_terminal(&self) -> bool {
        self.tree.root().is_terminal()
    }

    /// Legal moves at the root position.
    pub fn root_moves(&self) -> Vec<usize> {
        self.rules.legal_moves(&self.tree.root().board)
    }

    /// Runs one full simulation: descend by UCB1, expand one untried
    /// move, roll out to a verdict, propagate the outcome back up.
    pub fn simulate(&mut self, rng: &mut impl Rng) -> Result<(), SearchError> {
        let mut id = SearchTree::ROOT;

        // Selection: descend while the node is expanded and undecided.
        loop {
            let node = self.tree.get(id);
            if node.is_terminal() || !node.is_fully_expanded() {
                break;
            }
            match self.tree.select_child(id, self.config.exploration_constant) {
                Some(child) => id = child,
                None => break,
            }
        }

        // Expansion: one uniformly random untried move, unless the
        // node is terminal.
        let leaf = if self.tree.get(id).is_terminal() {
            id
        } else {
            // An undecided node with nothing to try means the rules
            // contradicted themselves.
            let mv = {
                let node = self.tree.get(id);
                *node
                    .untried
                    .choose(rng)
                    .ok_or(SearchError::InconsistentBoard)?
            };
            self.expand(id, mv)?
        };

        // Rollout from the leaf, then score for the player who moved
        // into it.
        let leaf_node = self.tree.get(leaf);
        let verdict = match leaf_node.verdict {
            Some(v) => v,
            None => rollout(&self.rules, leaf_node.board.clone(), leaf_node.player_to_move, rng),
        };
        let mover = self.tree.get(leaf).player_to_move.opponent();
        let outcome = score_for(verdict, mover);
        self.tree.backpropagate(leaf, outcome);

        self.completed += 1;
        trace!(completed = self.completed, ?verdict, "simulation done");
        Ok(())
    }

    fn expand(&mut self, parent: NodeId, mv: usize) -> Result<NodeId, SearchError> {
        let (board, player) = {
            let node = self.tree.get(parent);
            if !node.board.is_vacant(mv) {
                return Err(SearchError::IllegalExpansion { mv });
            }
            (node.board.with_move(mv, node.player_to_move), node.player_to_move)
        };
        let verdict = self.rules.winner(&board);
        let untried = self.rules.legal_moves(&board);
        let child = SearchNode::new(parent, Some(mv), board, player.opponent(), verdict, untried);
        Ok(self.tree.add_child(parent, mv, child)?)
    }

    /// Runs up to `config.batch_size` simulations, stopping early at
    /// the budget. Returns the number actually run.
    pub fn run_batch(&mut self, rng: &mut impl Rng) -> Result<u32, SearchError> {
        let remaining = self.config.simulations.saturating_sub(self.completed);
        let batch = remaining.min(self.config.batch_size);
        for _ in 0..batch {
            self.simulate(rng)?;
        }
        Ok(batch)
    }

    /// Runs the whole budget in one call.
    pub fn run(&mut self, rng: &mut impl Rng) -> Result<(), SearchError> {
        while !self.is_finished() {
            self.run_batch(rng)?;
        }
        Ok(())
    }

    /// Root move with the most visits.
    pub fn best_move(&self) -> Result<usize, SearchError> {
        self.tree.best_move().ok_or(SearchError::EmptyTree)
    }

    pub fn progress(&self) -> SearchProgress {
        SearchProgress {
            completed: self.completed,
            budget: self.config.simulations,
            best_move: self.tree.best_move(),
            visit_fractions: self.tree.visit_fractions(),
        }
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

/// Plays uniformly random moves from `board` until the game ends.
fn rollout<G: GameRules>(rules: &G, mut board: Board, mut to_move: Player, rng: &mut impl Rng) -> Verdict {
    loop {
        if let Some(verdict) = rules.winner(&board) {
            return verdict;
        }
        let moves = rules.legal_moves(&board);
        match moves.choose(rng) {
            Some(&mv) => {
                board = board.with_move(mv, to_move);
                to_move = to_move.opponent();
            }
            // Undecided with no moves; treat as drawn rather than spin.
            None => return Verdict::Draw,
        }
    }
}

/// Convenience wrapper: search `board` to completion and return the
/// chosen move.
pub fn run_search<G: GameRules>(
    rules: G,
    board: Board,
    player_to_move: Player,
    config: SearchConfig,
    rng: &mut impl Rng,
) -> Result<usize, SearchError> {
    let mut search = MctsSearch::new(rules, board, player_to_move, config)?;
    search.run(rng)?;
    search.best_move()
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_tictactoe::TicTacToe;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn board(pattern: &str) -> Board {
        let cells = pattern
            .chars()
            .map(|c| match c {
                'x' => Some(Player::A),
                'o' => Some(Player::B),
                _ => None,
            })
            .collect();
        Board::from_cells(cells)
    }

    #[test]
    fn rejects_a_board_of_the_wrong_size() {
        let err = MctsSearch::new(TicTacToe, Board::empty(7), Player::A, SearchConfig::for_testing());
        assert_eq!(err.err(), Some(SearchError::InconsistentBoard));
    }

    #[test]
    fn best_move_on_a_fresh_search_is_empty_tree() {
        let search =
            MctsSearch::new(TicTacToe, Board::empty(9), Player::A, SearchConfig::for_testing()).unwrap();
        assert_eq!(search.best_move(), Err(SearchError::EmptyTree));
    }

    #[test]
    fn run_stops_exactly_at_the_budget() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let config = SearchConfig::default().with_simulations(37).with_batch_size(10);
        let mut search = MctsSearch::new(TicTacToe, Board::empty(9), Player::A, config).unwrap();
        search.run(&mut rng).unwrap();
        assert_eq!(search.completed(), 37);
        assert_eq!(search.stats().root_visits, 37);
    }

    #[test]
    fn batches_shrink_to_the_remaining_budget() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let config = SearchConfig::default().with_simulations(25).with_batch_size(20);
        let mut search = MctsSearch::new(TicTacToe, Board::empty(9), Player::A, config).unwrap();
        assert_eq!(search.run_batch(&mut rng).unwrap(), 20);
        assert_eq!(search.run_batch(&mut rng).unwrap(), 5);
        assert_eq!(search.run_batch(&mut rng).unwrap(), 0);
    }

    #[test]
    fn finds_an_immediate_winning_move() {
        // x x .        The winning move for A is 2.
        // o o .
        // . . .
        for seed in 0..10u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mv = run_search(
                TicTacToe,
                board("xx.oo...."),
                Player::A,
                SearchConfig::default().with_simulations(300),
                &mut rng,
            )
            .unwrap();
            assert_eq!(mv, 2, "seed {seed}");
        }
    }

    #[test]
    fn blocks_an_immediate_losing_move() {
        // o o .        B threatens 2; A must block.
        // x . .
        // x . .
        for seed in 0..10u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mv = run_search(
                TicTacToe,
                board("oo.x..x.."),
                Player::A,
                SearchConfig::default().with_simulations(400),
                &mut rng,
            )
            .unwrap();
            assert_eq!(mv, 2, "seed {seed}");
        }
    }

    #[test]
    fn returned_moves_are_always_legal() {
        let start = board("x...o....");
        for seed in 0..20u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mv = run_search(
                TicTacToe,
                start.clone(),
                Player::A,
                SearchConfig::for_testing(),
                &mut rng,
            )
            .unwrap();
            assert!(start.is_vacant(mv), "seed {seed} picked occupied cell {mv}");
        }
    }

    #[test]
    fn terminal_root_simulations_touch_no_new_nodes() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let won = board("xxxoo....");
        let mut search =
            MctsSearch::new(TicTacToe, won, Player::B, SearchConfig::for_testing()).unwrap();
        assert!(search.root_is_terminal());
        search.run_batch(&mut rng).unwrap();
        assert_eq!(search.stats().node_count, 1);
        assert_eq!(search.best_move(), Err(SearchError::EmptyTree));
    }

    #[test]
    fn progress_reports_fractions_that_sum_to_at_most_one() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut search =
            MctsSearch::new(TicTacToe, Board::empty(9), Player::A, SearchConfig::for_testing()).unwrap();
        search.run(&mut rng).unwrap();
        let progress = search.progress();
        assert_eq!(progress.completed, progress.budget);
        assert!(progress.best_move.is_some());
        // Every simulation passes through exactly one root child, so
        // the child visits account for every root visit.
        let total: f64 = progress.visit_fractions.iter().map(|(_, f)| f).sum();
        assert!((total - 1.0).abs() < 1e-9, "total {total}");
    }

    #[test]
    fn an_undecided_board_with_no_moves_is_inconsistent() {
        struct NoMoves;
        impl GameRules for NoMoves {
            fn board_cells(&self) -> usize {
                9
            }
            fn winner(&self, _board: &Board) -> Option<Verdict> {
                None
            }
            fn legal_moves(&self, _board: &Board) -> Vec<usize> {
                Vec::new()
            }
        }
        let err = MctsSearch::new(NoMoves, Board::empty(9), Player::A, SearchConfig::for_testing());
        assert_eq!(err.err(), Some(SearchError::InconsistentBoard));
    }

    #[test]
    fn the_opening_move_favours_the_centre() {
        let mut centre = 0;
        let seeds = 12u64;
        for seed in 0..seeds {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mv = run_search(
                TicTacToe,
                TicTacToe.new_board(),
                Player::A,
                SearchConfig::default().with_simulations(500),
                &mut rng,
            )
            .unwrap();
            assert!(mv < 9, "seed {seed}");
            if mv == games_tictactoe::CENTER {
                centre += 1;
            }
        }
        // Statistical, not exact: the centre should dominate the
        // opening picks over a spread of seeds.
        assert!(centre >= 4, "centre picked {centre}/{seeds} times");
    }

    #[test]
    fn deterministic_under_a_fixed_seed() {
        let run = |seed: u64| {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut search =
                MctsSearch::new(TicTacToe, board("....x...."), Player::B, SearchConfig::default())
                    .unwrap();
            search.run(&mut rng).unwrap();
            (
                search.best_move().unwrap(),
                search.stats(),
                search.progress().visit_fractions,
            )
        };
        // Same seed, same tree, same move.
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn rules_that_dry_up_mid_tree_surface_as_inconsistent() {
        // Undecided everywhere, but only the root has a move: the
        // expanded child is a dead end the selection walks into.
        struct DeadEnd;
        impl GameRules for DeadEnd {
            fn board_cells(&self) -> usize {
                9
            }
            fn winner(&self, _board: &Board) -> Option<Verdict> {
                None
            }
            fn legal_moves(&self, board: &Board) -> Vec<usize> {
                if board.cells().iter().all(|c| c.is_none()) {
                    vec![0]
                } else {
                    Vec::new()
                }
            }
        }
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut search =
            MctsSearch::new(DeadEnd, Board::empty(9), Player::A, SearchConfig::for_testing()).unwrap();
        search.simulate(&mut rng).unwrap();
        assert_eq!(search.simulate(&mut rng), Err(SearchError::InconsistentBoard));
    }
}

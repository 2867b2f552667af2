//! Shared types for two-player, perfect-information board games.
//!
//! This crate defines the board model and the [`GameRules`] contract that
//! game implementations (tic-tac-toe, connect-four) provide and the search
//! engine consumes. Rules are pure functions over a [`Board`]: no game
//! implementation holds mutable state of its own.

/// One of the two players. Player A always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    A,
    B,
}

impl Player {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }
}

/// A cell is either empty or owned by a player. Once owned, a cell is
/// never reset within a game.
pub type Cell = Option<Player>;

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Win(Player),
    Draw,
}

/// Map a verdict to a scalar from `player`'s perspective:
/// 1.0 for a win, 0.0 for a loss, 0.5 for a draw.
#[inline]
pub fn score_for(verdict: Verdict, player: Player) -> f64 {
    match verdict {
        Verdict::Win(winner) if winner == player => 1.0,
        Verdict::Win(_) => 0.0,
        Verdict::Draw => 0.5,
    }
}

/// A fixed-size board: an ordered sequence of cells.
///
/// Boards are cheap value types; the search tree snapshots one per node
/// rather than sharing cells with the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board with `len` cells.
    pub fn empty(len: usize) -> Self {
        Self {
            cells: vec![None; len],
        }
    }

    /// Build a board from explicit cells (test and rules helpers).
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cell(&self, idx: usize) -> Cell {
        self.cells[idx]
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// True if the cell at `idx` is unoccupied.
    #[inline]
    pub fn is_vacant(&self, idx: usize) -> bool {
        self.cells[idx].is_none()
    }

    /// True if no cell is unoccupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Return an independent snapshot of this board with `player` placed at
    /// `idx`. The target cell must be vacant; placing on an occupied cell is
    /// a caller bug.
    pub fn with_move(&self, idx: usize, player: Player) -> Board {
        debug_assert!(self.cells[idx].is_none(), "cell {idx} already occupied");
        let mut next = self.clone();
        next.cells[idx] = Some(player);
        next
    }
}

/// Rules of a finite, deterministic, alternating-turn game, expressed as
/// pure functions over a [`Board`].
///
/// Both functions sit on the search hot path and are called many times per
/// move decision; implementations should be O(lines) and O(cells)
/// respectively.
pub trait GameRules {
    /// Number of cells in this game's board.
    fn board_cells(&self) -> usize;

    /// A fresh board for the start of a game.
    fn new_board(&self) -> Board {
        Board::empty(self.board_cells())
    }

    /// Terminal test: `None` while the game is undecided, otherwise the
    /// verdict.
    fn winner(&self, board: &Board) -> Option<Verdict>;

    /// Cell indices that may legally be played.
    fn legal_moves(&self, board: &Board) -> Vec<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_flips() {
        assert_eq!(Player::A.opponent(), Player::B);
        assert_eq!(Player::B.opponent(), Player::A);
        assert_eq!(Player::A.opponent().opponent(), Player::A);
    }

    #[test]
    fn score_for_maps_outcomes() {
        assert_eq!(score_for(Verdict::Win(Player::A), Player::A), 1.0);
        assert_eq!(score_for(Verdict::Win(Player::B), Player::A), 0.0);
        assert_eq!(score_for(Verdict::Draw, Player::A), 0.5);
        assert_eq!(score_for(Verdict::Draw, Player::B), 0.5);
    }

    #[test]
    fn with_move_snapshots_one_cell() {
        let board = Board::empty(9);
        let next = board.with_move(4, Player::A);

        // Original untouched, exactly one cell changed in the copy.
        assert!(board.is_vacant(4));
        assert_eq!(next.cell(4), Some(Player::A));
        let changed = board
            .cells()
            .iter()
            .zip(next.cells())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn full_board_detection() {
        let mut board = Board::empty(3);
        assert!(!board.is_full());
        for i in 0..3 {
            board = board.with_move(i, Player::A);
        }
        assert!(board.is_full());
    }
}

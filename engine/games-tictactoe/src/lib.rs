//! Tic-tac-toe rules for the search engine.
//!
//! The board is a flat array of 9 cells indexed row-major:
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```

use game_core::{Board, GameRules, Player, Verdict};

pub const BOARD_CELLS: usize = 9;

/// Centre square, the strongest opening reply.
pub const CENTER: usize = 4;

/// All eight winning lines: rows, columns, diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Standard 3x3 tic-tac-toe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl GameRules for TicTacToe {
    fn board_cells(&self) -> usize {
        BOARD_CELLS
    }

    fn winner(&self, board: &Board) -> Option<Verdict> {
        for line in &LINES {
            if let Some(p) = board.cell(line[0]) {
                if board.cell(line[1]) == Some(p) && board.cell(line[2]) == Some(p) {
                    return Some(Verdict::Win(p));
                }
            }
        }
        if board.is_full() {
            return Some(Verdict::Draw);
        }
        None
    }

    fn legal_moves(&self, board: &Board) -> Vec<usize> {
        (0..BOARD_CELLS).filter(|&i| board.is_vacant(i)).collect()
    }
}

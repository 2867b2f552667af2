//! Connect Four rules for the search engine.
//!
//! The board is 7 columns by 6 rows, stored as a flat array of 42
//! cells. Index `col + row * COLS` with row 0 at the bottom. A move is
//! a cell index, but the only legal move in a column is its lowest
//! vacant cell, so the move set has at most one entry per column.

use game_core::{Board, GameRules, Player, Verdict};

pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_CELLS: usize = COLS * ROWS;

const CONNECT: usize = 4;

/// (dx, dy) for the four line directions. Opposite directions are
/// covered by walking both ways from each occupied cell.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Standard 7x6 Connect Four.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectFour;

impl ConnectFour {
    /// Lowest vacant cell index in `col`, if the column is not full.
    fn drop_cell(board: &Board, col: usize) -> Option<usize> {
        (0..ROWS).map(|row| col + row * COLS).find(|&idx| board.is_vacant(idx))
    }

    fn run_length(board: &Board, player: Player, col: isize, row: isize, dx: isize, dy: isize) -> usize {
        let mut count = 0;
        let (mut c, mut r) = (col + dx, row + dy);
        while (0..COLS as isize).contains(&c)
            && (0..ROWS as isize).contains(&r)
            && board.cell((c + r * COLS as isize) as usize) == Some(player)
        {
            count += 1;
            c += dx;
            r += dy;
        }
        count
    }
}

impl GameRules for ConnectFour {
    fn board_cells(&self) -> usize {
        BOARD_CELLS
    }

    fn winner(&self, board: &Board) -> Option<Verdict> {
        for idx in 0..BOARD_CELLS {
            let Some(player) = board.cell(idx) else { continue };
            let col = (idx % COLS) as isize;
            let row = (idx / COLS) as isize;
            for (dx, dy) in DIRECTIONS {
                let run = 1
                    + Self::run_length(board, player, col, row, dx, dy)
                    + Self::run_length(board, player, col, row, -dx, -dy);
                if run >= CONNECT {
                    return Some(Verdict::Win(player));
                }
            }
        }
        if board.is_full() {
            return Some(Verdict::Draw);
        }
        None
    }

    fn legal_moves(&self, board: &Board) -> Vec<usize> {
        (0..COLS).filter_map(|col| Self::drop_cell(board, col)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn play(board: Board, col: usize, player: Player) -> Board {
        let idx = ConnectFour::drop_cell(&board, col).unwrap();
        board.with_move(idx, player)
    }

    #[test]
    fn fresh_board_offers_one_move_per_column() {
        let rules = ConnectFour;
        let b = rules.new_board();
        assert_eq!(rules.legal_moves(&b), (0..COLS).collect::<Vec<_>>());
    }

    #[test]
    fn moves_stack_upward_in_a_column() {
        let rules = ConnectFour;
        let mut b = rules.new_board();
        for i in 0..ROWS {
            let moves = rules.legal_moves(&b);
            assert!(moves.contains(&(3 + i * COLS)));
            b = play(b, 3, Player::A);
        }
        // Column 3 is full, no move lands there any more.
        assert!(rules.legal_moves(&b).iter().all(|&m| m % COLS != 3));
    }

    #[test]
    fn detects_horizontal_win() {
        let rules = ConnectFour;
        let mut b = rules.new_board();
        for col in 0..3 {
            b = play(b, col, Player::A);
            b = play(b, col, Player::B);
        }
        assert_eq!(rules.winner(&b), None);
        b = play(b, 3, Player::A);
        assert_eq!(rules.winner(&b), Some(Verdict::Win(Player::A)));
    }

    #[test]
    fn detects_vertical_win() {
        let rules = ConnectFour;
        let mut b = rules.new_board();
        for _ in 0..3 {
            b = play(b, 0, Player::B);
            b = play(b, 1, Player::A);
        }
        b = play(b, 0, Player::B);
        assert_eq!(rules.winner(&b), Some(Verdict::Win(Player::B)));
    }

    #[test]
    fn detects_diagonal_win() {
        let rules = ConnectFour;
        let mut b = rules.new_board();
        // Staircase: A on the rising diagonal from (0,0) to (3,3).
        b = play(b, 0, Player::A);
        b = play(b, 1, Player::B);
        b = play(b, 1, Player::A);
        b = play(b, 2, Player::B);
        b = play(b, 2, Player::B);
        b = play(b, 2, Player::A);
        b = play(b, 3, Player::B);
        b = play(b, 3, Player::B);
        b = play(b, 3, Player::B);
        b = play(b, 3, Player::A);
        assert_eq!(rules.winner(&b), Some(Verdict::Win(Player::A)));
    }

    #[test]
    fn random_games_terminate_with_consistent_verdicts() {
        let rules = ConnectFour;
        for seed in 0..20u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut b = rules.new_board();
            let mut to_move = Player::A;
            let verdict = loop {
                if let Some(v) = rules.winner(&b) {
                    break v;
                }
                let moves = rules.legal_moves(&b);
                assert!(!moves.is_empty());
                let &mv = moves.choose(&mut rng).unwrap();
                b = b.with_move(mv, to_move);
                to_move = to_move.opponent();
            };
            if let Verdict::Win(winner) = verdict {
                assert_eq!(winner, to_move.opponent(), "seed {seed}");
            }
        }
    }
}

//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell};
use crate::core::ActorId;
use tracing::instrument;

/// All eight lines as `(row, col)` triples.
const LINES: [[(usize, usize); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Checks if there is a winner on the board.
///
/// Returns the actor owning three in a row, `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<ActorId> {
    for [a, b, c] in LINES {
        let cell = board.get(a.0, a.1);
        if cell != Some(Cell::Empty) && cell == board.get(b.0, b.1) && cell == board.get(c.0, c.1)
        {
            return cell.and_then(Cell::owner);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new();
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_winner_top_row() {
        let mut board = Board::new();
        board.set(0, 0, Cell::X);
        board.set(0, 1, Cell::X);
        board.set(0, 2, Cell::X);
        assert_eq!(check_winner(&board), Some(ActorId::AgentA));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let mut board = Board::new();
        board.set(0, 2, Cell::O);
        board.set(1, 1, Cell::O);
        board.set(2, 0, Cell::O);
        assert_eq!(check_winner(&board), Some(ActorId::AgentB));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let mut board = Board::new();
        board.set(0, 0, Cell::X);
        board.set(0, 1, Cell::X);
        board.set(0, 2, Cell::O);
        assert_eq!(check_winner(&board), None);
    }
}

//! Win detection for five-in-a-row.

use crate::game::board::Board;
use crate::game::types::{Piece, WIN_LENGTH};

/// The four scan axes: horizontal, vertical, and both diagonals.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Checks whether a stone of `piece` at `(row, col)` completes a run of
/// five or more.
///
/// The cell itself is assumed to hold `piece`, whether or not it has been
/// written yet, so the same scan serves both the post-placement win check
/// and hypothetical probing by a move provider. Runs longer than five
/// count as wins.
pub fn is_winning_placement(board: &Board, row: usize, col: usize, piece: Piece) -> bool {
    if piece == Piece::Empty {
        return false;
    }
    for (dr, dc) in AXES {
        let count = 1
            + count_direction(board, row, col, dr, dc, piece)
            + count_direction(board, row, col, -dr, -dc, piece);
        if count >= WIN_LENGTH {
            return true;
        }
    }
    false
}

/// Counts contiguous `piece` stones stepping away from `(row, col)`,
/// excluding the starting cell.
fn count_direction(
    board: &Board,
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
    piece: Piece,
) -> usize {
    let mut count = 0;
    let mut r = row as isize + dr;
    let mut c = col as isize + dc;
    while r >= 0 && c >= 0 {
        match board.get(r as usize, c as usize) {
            Some(p) if p == piece => count += 1,
            _ => break,
        }
        r += dr;
        c += dc;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_run(cells: &[(usize, usize)], piece: Piece) -> Board {
        let mut board = Board::new();
        for &(r, c) in cells {
            assert!(board.place(r, c, piece));
        }
        board
    }

    #[test]
    fn test_empty_board_no_win() {
        let board = Board::new();
        assert!(!is_winning_placement(&board, 7, 7, Piece::Black));
    }

    #[test]
    fn test_horizontal_five() {
        let board = board_with_run(&[(7, 3), (7, 4), (7, 5), (7, 6)], Piece::Black);
        assert!(is_winning_placement(&board, 7, 7, Piece::Black));
    }

    #[test]
    fn test_vertical_five() {
        let board = board_with_run(&[(2, 9), (3, 9), (4, 9), (5, 9)], Piece::White);
        assert!(is_winning_placement(&board, 6, 9, Piece::White));
    }

    #[test]
    fn test_diagonal_five() {
        let board = board_with_run(&[(1, 1), (2, 2), (3, 3), (4, 4)], Piece::Black);
        assert!(is_winning_placement(&board, 5, 5, Piece::Black));
    }

    #[test]
    fn test_anti_diagonal_five() {
        let board = board_with_run(&[(4, 10), (5, 9), (6, 8), (7, 7)], Piece::White);
        assert!(is_winning_placement(&board, 8, 6, Piece::White));
    }

    #[test]
    fn test_placement_in_middle_of_run() {
        // Two stones on each side of the placed cell.
        let board = board_with_run(&[(7, 3), (7, 4), (7, 6), (7, 7)], Piece::Black);
        assert!(is_winning_placement(&board, 7, 5, Piece::Black));
    }

    #[test]
    fn test_four_is_not_a_win() {
        let board = board_with_run(&[(7, 4), (7, 5), (7, 6)], Piece::Black);
        assert!(!is_winning_placement(&board, 7, 7, Piece::Black));
    }

    #[test]
    fn test_overline_counts_as_win() {
        // Completing a run of six still wins.
        let board = board_with_run(&[(7, 2), (7, 3), (7, 4), (7, 6), (7, 7)], Piece::Black);
        assert!(is_winning_placement(&board, 7, 5, Piece::Black));
    }

    #[test]
    fn test_opponent_stones_break_run() {
        let mut board = board_with_run(&[(7, 3), (7, 4), (7, 6)], Piece::Black);
        assert!(board.place(7, 5, Piece::White));
        assert!(!is_winning_placement(&board, 7, 7, Piece::Black));
    }

    #[test]
    fn test_probe_does_not_require_stone_present() {
        // The probed cell is still vacant.
        let board = board_with_run(&[(0, 0), (0, 1), (0, 2), (0, 3)], Piece::White);
        assert!(board.is_vacant(0, 4));
        assert!(is_winning_placement(&board, 0, 4, Piece::White));
    }
}

//! Core domain types for five-in-a-row.

use serde::{Deserialize, Serialize};

/// Length of a winning run.
pub const WIN_LENGTH: usize = 5;

/// A stone on the board, or the absence of one.
///
/// `Black` moves first. `Black` and `White` are symmetric opposites;
/// `Empty` is its own opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    /// No stone.
    Empty,
    /// Black stone (moves first).
    Black,
    /// White stone (moves second).
    White,
}

impl Piece {
    /// Returns the opposing color. `Empty` maps to itself.
    pub fn opposite(self) -> Self {
        match self {
            Piece::Black => Piece::White,
            Piece::White => Piece::Black,
            Piece::Empty => Piece::Empty,
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Piece::Empty => "empty",
            Piece::Black => "black",
            Piece::White => "white",
        };
        write!(f, "{}", name)
    }
}

/// A single accepted placement.
///
/// Created by the engine when a placement is accepted; never mutated
/// afterwards. `piece` is always `Black` or `White`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Row of the placement.
    pub row: usize,
    /// Column of the placement.
    pub col: usize,
    /// Color that made the placement.
    pub piece: Piece,
}

impl Move {
    /// Creates a move record.
    pub fn new(row: usize, col: usize, piece: Piece) -> Self {
        Self { row, col, piece }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Black aligned five.
    BlackWins,
    /// White aligned five.
    WhiteWins,
    /// Board filled with no winner.
    Draw,
}

impl Outcome {
    /// Returns the winning outcome for the given color.
    pub fn win_for(piece: Piece) -> Self {
        match piece {
            Piece::Black => Outcome::BlackWins,
            Piece::White => Outcome::WhiteWins,
            Piece::Empty => Outcome::Draw,
        }
    }
}

/// Current status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are being accepted.
    Playing,
    /// Game over; no further placements are accepted.
    Finished(Outcome),
}

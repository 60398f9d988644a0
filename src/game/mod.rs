//! Game-state engine: board, rules, history and the observer interface.

mod board;
mod engine;
mod listener;
pub mod rules;
mod types;

pub use board::{BOARD_SIZE, Board, CELL_COUNT};
pub use engine::Game;
pub use listener::GameListener;
pub use types::{GameStatus, Move, Outcome, Piece, WIN_LENGTH};

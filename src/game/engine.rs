//! The authoritative game engine: move legality, history, win and draw
//! detection.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::board::Board;
use super::listener::GameListener;
use super::rules;
use super::types::{GameStatus, Move, Outcome, Piece};

/// A five-in-a-row game.
///
/// The engine is the single authority on move legality. Placements,
/// undo and reset all notify the registered [`GameListener`]
/// synchronously, in the order the mutations happen.
#[derive(Clone)]
pub struct Game {
    board: Board,
    history: Vec<Move>,
    current_turn: Piece,
    status: GameStatus,
    listener: Option<Arc<dyn GameListener>>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("current_turn", &self.current_turn)
            .field("status", &self.status)
            .field("moves", &self.history.len())
            .finish()
    }
}

impl Game {
    /// Creates a new game with Black to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            history: Vec::new(),
            current_turn: Piece::Black,
            status: GameStatus::Playing,
            listener: None,
        }
    }

    /// Registers the observer that receives state-change notifications.
    pub fn set_listener(&mut self, listener: Arc<dyn GameListener>) {
        self.listener = Some(listener);
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side currently permitted to place a stone.
    pub fn current_turn(&self) -> Piece {
        self.current_turn
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the applied moves, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Attempts to place a stone.
    ///
    /// Returns false, with no side effect, when the game is not in
    /// progress, the coordinates are off the board, the cell is occupied,
    /// or `piece` is not the current turn holder. On acceptance the cell
    /// is written, the move recorded, and the observer notified; then the
    /// engine checks for a win (a run of five or more through the placed
    /// cell) or a draw (board full), or flips the turn.
    #[instrument(skip(self), fields(turn = %self.current_turn))]
    pub fn place_piece(&mut self, row: usize, col: usize, piece: Piece) -> bool {
        if self.status != GameStatus::Playing {
            debug!("placement rejected: game not in progress");
            return false;
        }
        if piece != self.current_turn {
            debug!(%piece, "placement rejected: not this side's turn");
            return false;
        }
        if !self.board.place(row, col, piece) {
            debug!("placement rejected: cell occupied or out of bounds");
            return false;
        }

        self.history.push(Move::new(row, col, piece));
        self.notify(|l| l.piece_placed(row, col, piece));

        if rules::is_winning_placement(&self.board, row, col, piece) {
            let outcome = Outcome::win_for(piece);
            self.status = GameStatus::Finished(outcome);
            debug!(?outcome, "game over");
            self.notify(|l| l.game_over(outcome));
        } else if rules::is_full(&self.board) {
            self.status = GameStatus::Finished(Outcome::Draw);
            debug!("game over: draw");
            self.notify(|l| l.game_over(Outcome::Draw));
        } else {
            self.current_turn = piece.opposite();
            self.notify(|l| l.turn_changed(self.current_turn));
        }

        true
    }

    /// Takes back the most recent move.
    ///
    /// No-op when the game is not in progress or no moves have been made.
    /// The turn returns to the side whose move was undone. A finished
    /// game cannot be unwound; reset instead.
    pub fn undo(&mut self) {
        if self.status != GameStatus::Playing {
            warn!("undo ignored: game not in progress");
            return;
        }
        let Some(last) = self.history.pop() else {
            return;
        };
        self.board.clear(last.row, last.col);
        self.current_turn = last.piece;
        self.notify(|l| l.undo(last.row, last.col));
        self.notify(|l| l.turn_changed(self.current_turn));
    }

    /// Clears the board and history and starts a fresh game, Black to
    /// move.
    pub fn reset(&mut self) {
        self.board.clear_all();
        self.history.clear();
        self.current_turn = Piece::Black;
        self.status = GameStatus::Playing;
        self.notify(|l| l.board_reset());
    }

    fn notify(&self, f: impl FnOnce(&dyn GameListener)) {
        if let Some(listener) = &self.listener {
            f(listener.as_ref());
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

//! Drives a match between two move providers.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::game::{Game, GameStatus, Outcome, Piece};
use crate::players::MoveSource;

/// Runs one game to completion by alternately asking each side's
/// provider for its move.
///
/// This is the "on your turn" hook for non-human-driven sides: after
/// every accepted placement (and immediately after a reset) the new turn
/// holder's provider is consulted. The engine stays the sole authority;
/// a provider returning an illegal cell is simply asked again.
pub struct Orchestrator {
    game: Game,
    black: Box<dyn MoveSource>,
    white: Box<dyn MoveSource>,
}

impl Orchestrator {
    /// Creates an orchestrator over a fresh game.
    pub fn new(black: Box<dyn MoveSource>, white: Box<dyn MoveSource>) -> Self {
        Self {
            game: Game::new(),
            black,
            white,
        }
    }

    /// Returns the game being driven.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Runs until the game finishes and returns the outcome.
    pub async fn run(&mut self) -> Result<Outcome> {
        info!(black = self.black.name(), white = self.white.name(), "match starting");
        loop {
            if let GameStatus::Finished(outcome) = self.game.status() {
                info!(?outcome, "match finished");
                return Ok(outcome);
            }

            let side = self.game.current_turn();
            let provider = match side {
                Piece::Black => &mut self.black,
                Piece::White => &mut self.white,
                Piece::Empty => unreachable!("turn holder is always a color"),
            };

            let (row, col) = provider.next_move(&self.game).await?;
            debug!(%side, row, col, "provider proposed move");
            if !self.game.place_piece(row, col, side) {
                warn!(%side, row, col, "provider proposed illegal move, asking again");
            }
        }
    }

    /// Restarts the game and plays another round.
    pub async fn rematch(&mut self) -> Result<Outcome> {
        self.game.reset();
        self.run().await
    }
}

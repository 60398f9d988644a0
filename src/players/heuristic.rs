//! Heuristic opponent: win, block, take the center, spread outward.

use anyhow::Result;
use tracing::debug;

use super::MoveSource;
use crate::game::{BOARD_SIZE, Game, Piece, rules};

/// A simple local-search opponent.
///
/// Priority order: take an immediately winning cell, block the
/// opponent's immediately winning cell, take the center, then the
/// nearest vacant cell spiralling out from the center. Candidate cells
/// are probed through the rules scan; the engine's board is never
/// touched.
pub struct HeuristicSource {
    name: String,
}

impl HeuristicSource {
    /// Creates a heuristic opponent.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn choose(&self, game: &Game) -> Option<(usize, usize)> {
        let board = game.board();
        let me = game.current_turn();
        let enemy = me.opposite();

        if let Some(cell) = find_winning_cell(game, me) {
            debug!(row = cell.0, col = cell.1, "taking winning cell");
            return Some(cell);
        }
        if let Some(cell) = find_winning_cell(game, enemy) {
            debug!(row = cell.0, col = cell.1, "blocking opponent");
            return Some(cell);
        }

        let center = BOARD_SIZE / 2;
        if board.is_vacant(center, center) {
            return Some((center, center));
        }

        // Expand outward from the center, cross directions first.
        for step in 1..=center {
            let candidates = [
                (center.wrapping_sub(step), center),
                (center + step, center),
                (center, center.wrapping_sub(step)),
                (center, center + step),
                (center.wrapping_sub(step), center.wrapping_sub(step)),
                (center.wrapping_sub(step), center + step),
                (center + step, center.wrapping_sub(step)),
                (center + step, center + step),
            ];
            for (r, c) in candidates {
                if board.is_vacant(r, c) {
                    return Some((r, c));
                }
            }
        }

        // Fall back to any vacant cell.
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if board.is_vacant(row, col) {
                    return Some((row, col));
                }
            }
        }
        None
    }
}

/// Finds a vacant cell that would complete five for `piece`, if any.
fn find_winning_cell(game: &Game, piece: Piece) -> Option<(usize, usize)> {
    let board = game.board();
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            if board.is_vacant(row, col) && rules::is_winning_placement(board, row, col, piece) {
                return Some((row, col));
            }
        }
    }
    None
}

#[async_trait::async_trait]
impl MoveSource for HeuristicSource {
    async fn next_move(&mut self, game: &Game) -> Result<(usize, usize)> {
        self.choose(game)
            .ok_or_else(|| anyhow::anyhow!("no vacant cell available"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

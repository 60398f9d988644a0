//! Move providers: where the next move for a side comes from.

mod heuristic;
mod local;
mod remote;

pub use heuristic::HeuristicSource;
pub use local::LocalSource;
pub use remote::RemoteSource;

use anyhow::Result;

use crate::game::Game;

/// Supplies the next move for the side whose turn it is.
///
/// Implementations cover a locally captured human, a heuristic opponent,
/// and a remote peer whose moves arrive over the network. The provider
/// never mutates the game; the engine remains the authority on legality.
#[async_trait::async_trait]
pub trait MoveSource: Send {
    /// Produces the `(row, col)` of the next move.
    ///
    /// Called only when it is this provider's turn. May wait
    /// indefinitely (for human input or a relayed move).
    async fn next_move(&mut self, game: &Game) -> Result<(usize, usize)>;

    /// Returns the provider's display name.
    fn name(&self) -> &str;
}

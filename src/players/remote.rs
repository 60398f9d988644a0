//! Move provider fed by a remote peer's relayed moves.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use super::MoveSource;
use crate::game::Game;
use crate::net::Message;

/// The remote side of a network match.
///
/// A connection's receive loop pushes every inbound protocol message
/// into this provider's channel; `next_move` waits for the next `move`
/// frame and ignores everything else. Legality is still checked by the
/// local engine when the move is applied.
pub struct RemoteSource {
    name: String,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl RemoteSource {
    /// Creates the provider and the sender the receive loop feeds.
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedSender<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                rx,
            },
            tx,
        )
    }
}

#[async_trait::async_trait]
impl MoveSource for RemoteSource {
    async fn next_move(&mut self, _game: &Game) -> Result<(usize, usize)> {
        loop {
            let msg = self
                .rx
                .recv()
                .await
                .ok_or_else(|| anyhow::anyhow!("peer connection closed"))?;
            match msg {
                Message::Move { row, col, .. } => return Ok((row, col)),
                other => {
                    debug!(kind = ?other, "ignoring non-move frame while awaiting move");
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

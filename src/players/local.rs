//! Move provider fed by externally captured input.

use anyhow::Result;
use tokio::sync::mpsc;

use super::MoveSource;
use crate::game::Game;

/// A locally driven side: moves are pushed in from the outside (a board
/// click, a console prompt) and the provider simply waits for the next
/// one.
pub struct LocalSource {
    name: String,
    rx: mpsc::UnboundedReceiver<(usize, usize)>,
}

impl LocalSource {
    /// Creates the provider and the sender that feeds it.
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedSender<(usize, usize)>) {
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
impl MoveSource for LocalSource {
    async fn next_move(&mut self, _game: &Game) -> Result<(usize, usize)> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("input channel closed"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

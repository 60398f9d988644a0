//! Client side of the wire protocol: one long-lived connection to the
//! relay.

use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info};

use super::protocol::{self, Message, ProtocolError};

/// A participant's connection to the relay process.
///
/// Announces the display name on connect; afterwards the caller drives
/// `send` and `recv` directly (joining a room, relaying placements,
/// answering agreement requests).
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    /// Connects to the relay and announces `name`.
    pub async fn connect(host: &str, port: u16, name: &str) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect((host, port)).await?;
        info!(host, port, name, "connected to relay");
        let (read_half, write_half) = stream.into_split();
        let mut conn = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        conn.send(&Message::Identity {
            name: name.to_string(),
        })
        .await?;
        Ok(conn)
    }

    /// Sends one frame.
    pub async fn send(&mut self, msg: &Message) -> Result<(), ProtocolError> {
        protocol::write_message(&mut self.writer, msg).await
    }

    /// Receives the next frame; `None` on a clean close.
    pub async fn recv(&mut self) -> Result<Option<Message>, ProtocolError> {
        let msg = protocol::read_message(&mut self.reader).await?;
        if let Some(msg) = &msg {
            debug!(kind = ?msg, "frame received");
        }
        Ok(msg)
    }

    /// Asks to join a specific room, or any room via
    /// [`protocol::ANY_ROOM`].
    pub async fn join_room(&mut self, room: &str) -> Result<(), ProtocolError> {
        self.send(&Message::JoinRoom {
            room: room.to_string(),
        })
        .await
    }

    /// Sends a placement for relay to both participants.
    pub async fn send_move(
        &mut self,
        row: usize,
        col: usize,
        piece: crate::game::Piece,
    ) -> Result<(), ProtocolError> {
        self.send(&Message::Move { row, col, piece }).await
    }
}

//! Wire protocol: message kinds and line-delimited JSON framing.

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use crate::game::Piece;

/// Token accepted by `join-room` to mean "any joinable room".
pub const ANY_ROOM: &str = "random";

/// A protocol frame.
///
/// Every frame is one JSON object per line, tagged with its kind:
/// `{"kind": "move", "payload": {"row": 7, "col": 7, "piece": "black"}}`.
/// The set of kinds is exhaustive; anything else fails to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Client announces its display name.
    Identity {
        /// Display name of the participant.
        name: String,
    },
    /// Client asks to join a room: a specific id, or [`ANY_ROOM`].
    JoinRoom {
        /// Room id or the literal [`ANY_ROOM`] token.
        room: String,
    },
    /// Server confirms the join and the assigned side.
    RoomJoined {
        /// Id of the joined room.
        room: String,
        /// Side assigned to this participant.
        side: Piece,
    },
    /// Informational notice about the room.
    RoomInfo {
        /// Human-readable notice.
        text: String,
    },
    /// Both seats are filled; the match begins.
    GameStart {
        /// Id of the room.
        room: String,
        /// Side assigned to the receiving participant.
        side: Piece,
        /// Display name of the opponent.
        opponent: String,
    },
    /// A placement, relayed to both participants.
    Move {
        /// Row of the placement.
        row: usize,
        /// Column of the placement.
        col: usize,
        /// Color that placed.
        piece: Piece,
    },
    /// One side asks to take back the last move.
    UndoRequest,
    /// Accumulated undo agreement state for both sides.
    UndoResponse {
        /// Black's agreement flag.
        black: bool,
        /// White's agreement flag.
        white: bool,
    },
    /// One side asks to restart the game.
    ResetRequest,
    /// Accumulated reset agreement state for both sides.
    ResetResponse {
        /// Black's agreement flag.
        black: bool,
        /// White's agreement flag.
        white: bool,
    },
    /// The sender concedes the game.
    Surrender,
    /// Chat text, relayed to the opponent only.
    Chat {
        /// The chat line.
        text: String,
    },
    /// The peer left, or the server reports the opponent leaving.
    Disconnect {
        /// Why the session ended.
        reason: String,
    },
    /// The request could not be honored; state is unchanged.
    Error {
        /// What went wrong.
        text: String,
    },
}

/// Framing or transport failure on a connection.
#[derive(Debug, Display, Error, From)]
pub enum ProtocolError {
    /// A line arrived that does not parse as a protocol frame.
    #[display("malformed frame: {_0}")]
    Malformed(serde_json::Error),
    /// The underlying stream failed.
    #[display("connection i/o failed: {_0}")]
    Io(std::io::Error),
}

/// Serializes a frame to its single-line wire form (no trailing newline).
pub fn encode(msg: &Message) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

/// Parses one wire line into a frame.
pub fn decode(line: &str) -> Result<Message, ProtocolError> {
    Ok(serde_json::from_str(line)?)
}

/// Writes one frame followed by a newline and flushes.
pub async fn write_message<W>(writer: &mut W, msg: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWriteExt + Unpin,
{
    let mut line = encode(msg)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads the next non-blank line and parses it.
///
/// Returns `Ok(None)` on a clean end of stream. A line that fails to
/// parse is a [`ProtocolError::Malformed`]; the caller decides whether
/// to keep reading.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Message>, ProtocolError>
where
    R: AsyncBufReadExt + Unpin,
{
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        return decode(trimmed).map(Some);
    }
}

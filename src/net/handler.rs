//! Per-connection receive loop and message dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::protocol::{self, ANY_ROOM, Message, ProtocolError};
use super::registry::RoomRegistry;
use super::room::{Agreement, ConnId, Room};
use crate::game::Piece;

static NEXT_CONN: AtomicU64 = AtomicU64::new(1);

fn next_conn_id() -> ConnId {
    NEXT_CONN.fetch_add(1, Ordering::Relaxed)
}

/// Whether the receive loop should keep going after a frame.
enum Flow {
    Continue,
    Disconnect,
}

/// Owns one participant's lifecycle: identity, room membership, and the
/// dispatch of every inbound frame.
///
/// Outbound frames go through an unbounded channel drained by a writer
/// task, so relaying to this participant never blocks whichever handler
/// is dispatching.
pub struct ClientHandler {
    conn: ConnId,
    registry: Arc<RoomRegistry>,
    outbound: mpsc::UnboundedSender<Message>,
    name: String,
    room: Option<Arc<Room>>,
    side: Option<Piece>,
    closed: bool,
}

impl ClientHandler {
    fn new(registry: Arc<RoomRegistry>, outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            conn: next_conn_id(),
            registry,
            outbound,
            name: "anonymous".into(),
            room: None,
            side: None,
            closed: false,
        }
    }

    fn send(&self, msg: Message) {
        let _ = self.outbound.send(msg);
    }

    fn send_error(&self, text: impl Into<String>) {
        self.send(Message::Error { text: text.into() });
    }

    /// Drops a stale room assignment left behind when the opponent's
    /// departure abandoned the match.
    fn refresh_membership(&mut self) {
        if let Some(room) = &self.room {
            if room.seat_of(self.conn).is_none() {
                debug!(conn = self.conn, room = %room.id(), "seat lost, clearing assignment");
                self.room = None;
                self.side = None;
            }
        }
    }

    fn current_room(&mut self) -> Option<(Arc<Room>, Piece)> {
        self.refresh_membership();
        match (&self.room, self.side) {
            (Some(room), Some(side)) => Some((room.clone(), side)),
            _ => None,
        }
    }

    #[instrument(skip(self, msg), fields(conn = self.conn, name = %self.name))]
    fn handle_message(&mut self, msg: Message) -> Flow {
        match msg {
            Message::Identity { name } => {
                info!(%name, "identity announced");
                self.name = name;
            }
            Message::JoinRoom { room } => self.handle_join(&room),
            Message::Move { row, col, piece } => match self.current_room() {
                Some((room, _)) => room.broadcast_move(row, col, piece),
                None => self.send_error("not in a room"),
            },
            Message::UndoRequest => self.handle_agreement_request(Agreement::Undo),
            Message::UndoResponse { black, white } => {
                self.handle_agreement_response(Agreement::Undo, black, white)
            }
            Message::ResetRequest => self.handle_agreement_request(Agreement::Reset),
            Message::ResetResponse { black, white } => {
                self.handle_agreement_response(Agreement::Reset, black, white)
            }
            Message::Chat { text } => match self.current_room() {
                Some((room, side)) => room.relay_to_opponent(side, Message::Chat { text }),
                None => self.send_error("not in a room"),
            },
            Message::Surrender => match self.current_room() {
                Some((room, side)) => room.relay_to_opponent(side, Message::Surrender),
                None => self.send_error("not in a room"),
            },
            Message::Disconnect { .. } => return Flow::Disconnect,
            Message::RoomJoined { .. }
            | Message::RoomInfo { .. }
            | Message::GameStart { .. }
            | Message::Error { .. } => {
                warn!("client sent a server-only kind");
                self.send_error("unexpected message kind");
            }
        }
        Flow::Continue
    }

    fn handle_join(&mut self, target: &str) {
        self.refresh_membership();
        if self.room.is_some() {
            self.send_error("already in a room");
            return;
        }

        let room = if target == ANY_ROOM {
            match self.registry.find_joinable_room() {
                Some(room) => room,
                None => self.registry.create_room(),
            }
        } else {
            match self.registry.get_room(target) {
                Some(room) => room,
                None => {
                    self.send_error(format!("room not found: {}", target));
                    return;
                }
            }
        };

        match room.add_participant(self.conn, self.name.clone(), self.outbound.clone()) {
            Ok(side) => {
                info!(room = %room.id(), %side, "joined room");
                self.room = Some(room);
                self.side = Some(side);
            }
            Err(err) => self.send_error(err.to_string()),
        }
    }

    fn handle_agreement_request(&mut self, kind: Agreement) {
        match self.current_room() {
            Some((room, side)) => room.agreement_request(kind, side),
            None => self.send_error("not in a room"),
        }
    }

    fn handle_agreement_response(&mut self, kind: Agreement, black: bool, white: bool) {
        match self.current_room() {
            Some((room, _)) => room.agreement_response(kind, black, white),
            None => self.send_error("not in a room"),
        }
    }

    /// Releases the seat and, when the room empties, the room itself.
    /// Safe to call more than once.
    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(room) = self.room.take() {
            if room.remove_participant(self.conn) {
                self.registry.remove_room(room.id());
            }
        }
        self.side = None;
        info!(conn = self.conn, name = %self.name, "connection closed");
    }
}

/// Runs one participant's session to completion.
///
/// Reads one frame at a time and dispatches it. A malformed frame gets
/// an error reply and the loop continues; an unreadable stream or end of
/// input is treated exactly like an explicit disconnect.
pub async fn run(stream: TcpStream, registry: Arc<RoomRegistry>) -> Result<()> {
    let peer = stream.peer_addr()?;
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let (outbound, mut outbound_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if protocol::write_message(&mut write_half, &msg).await.is_err() {
                break;
            }
        }
    });

    let mut handler = ClientHandler::new(registry, outbound);
    info!(conn = handler.conn, %peer, "participant connected");
    handler.send(Message::RoomInfo {
        text: "connected to server".into(),
    });

    loop {
        match protocol::read_message(&mut reader).await {
            Ok(Some(msg)) => match handler.handle_message(msg) {
                Flow::Continue => {}
                Flow::Disconnect => break,
            },
            Ok(None) => break,
            Err(ProtocolError::Malformed(err)) => {
                warn!(conn = handler.conn, %err, "malformed frame");
                handler.send_error("malformed frame");
            }
            Err(ProtocolError::Io(err)) => {
                debug!(conn = handler.conn, %err, "read failed, treating as disconnect");
                break;
            }
        }
    }

    handler.close();
    // Dropping the handler releases the last outbound sender, letting the
    // writer drain queued frames and exit.
    drop(handler);
    let _ = writer.await;
    Ok(())
}

//! A two-participant match session: side assignment, move relay, and the
//! bilateral undo/reset agreement.

use std::sync::Mutex;

use derive_more::{Display, Error};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::protocol::Message;
use crate::game::Piece;

/// Identifies one connection for the lifetime of the process.
pub type ConnId = u64;

/// Lifecycle state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Zero or one seat filled; joinable.
    Waiting,
    /// Both seats filled; a match is running.
    Active,
}

/// Join rejection: both seats are taken.
#[derive(Debug, Display, Error)]
#[display("room is full")]
pub struct RoomFull;

/// Which action a bilateral agreement is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    /// Take back the most recent move.
    Undo,
    /// Restart the game.
    Reset,
}

/// One seated participant.
struct Participant {
    conn: ConnId,
    name: String,
    sender: mpsc::UnboundedSender<Message>,
}

impl Participant {
    fn send(&self, msg: Message) {
        // The receiving writer task may already be gone on disconnect.
        if self.sender.send(msg).is_err() {
            debug!(name = %self.name, "dropping frame for departed participant");
        }
    }
}

/// Per-side boolean agreement flags.
#[derive(Debug, Default, Clone, Copy)]
struct Votes {
    black: bool,
    white: bool,
}

impl Votes {
    fn set(&mut self, side: Piece) {
        match side {
            Piece::Black => self.black = true,
            Piece::White => self.white = true,
            Piece::Empty => {}
        }
    }

    fn both(self) -> bool {
        self.black && self.white
    }
}

struct RoomState {
    black: Option<Participant>,
    white: Option<Participant>,
    status: RoomStatus,
    undo_votes: Votes,
    reset_votes: Votes,
}

impl RoomState {
    fn seat(&self, side: Piece) -> Option<&Participant> {
        match side {
            Piece::Black => self.black.as_ref(),
            Piece::White => self.white.as_ref(),
            Piece::Empty => None,
        }
    }

    fn send_both(&self, msg: Message) {
        if let Some(p) = &self.black {
            p.send(msg.clone());
        }
        if let Some(p) = &self.white {
            p.send(msg);
        }
    }
}

/// A paired two-participant session hosting one match.
///
/// The room is a relay and consensus layer, not a second game authority:
/// each participant's own engine validates moves, and the room's job is
/// to deliver frames and host the agreement flags. All seat and flag
/// mutation is serialized behind the room's mutex, so racing requests
/// from the two connections cannot lose updates.
pub struct Room {
    id: String,
    state: Mutex<RoomState>,
}

impl Room {
    /// Creates an empty room with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(RoomState {
                black: None,
                white: None,
                status: RoomStatus::Waiting,
                undo_votes: Votes::default(),
                reset_votes: Votes::default(),
            }),
        }
    }

    /// Returns the room id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the lifecycle status.
    pub fn status(&self) -> RoomStatus {
        self.state.lock().unwrap().status
    }

    /// Returns true while a seat is free.
    pub fn is_joinable(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.black.is_none() || state.white.is_none()
    }

    /// Returns the side seated under `conn`, if that connection still
    /// holds a seat.
    pub fn seat_of(&self, conn: ConnId) -> Option<Piece> {
        let state = self.state.lock().unwrap();
        if state.black.as_ref().is_some_and(|p| p.conn == conn) {
            Some(Piece::Black)
        } else if state.white.as_ref().is_some_and(|p| p.conn == conn) {
            Some(Piece::White)
        } else {
            None
        }
    }

    /// Seats a participant: Black first, then White.
    ///
    /// The first arrival is told it is waiting for an opponent. The
    /// second arrival flips the room to Active and both sides receive
    /// `game-start` with their own side and the opponent's name.
    #[instrument(skip(self, sender), fields(room = %self.id))]
    pub fn add_participant(
        &self,
        conn: ConnId,
        name: String,
        sender: mpsc::UnboundedSender<Message>,
    ) -> Result<Piece, RoomFull> {
        let mut state = self.state.lock().unwrap();

        let side = if state.black.is_none() {
            Piece::Black
        } else if state.white.is_none() {
            Piece::White
        } else {
            warn!("join rejected: both seats taken");
            return Err(RoomFull);
        };

        let participant = Participant { conn, name, sender };
        participant.send(Message::RoomJoined {
            room: self.id.clone(),
            side,
        });

        match side {
            Piece::Black => {
                participant.send(Message::RoomInfo {
                    text: "waiting for an opponent".into(),
                });
                state.black = Some(participant);
                info!(side = %side, "participant seated");
            }
            Piece::White => {
                state.white = Some(participant);
                state.status = RoomStatus::Active;
                info!(side = %side, "participant seated, match starting");
                let black = state.black.as_ref().expect("black seated first");
                let white = state.white.as_ref().expect("white just seated");
                black.send(Message::GameStart {
                    room: self.id.clone(),
                    side: Piece::Black,
                    opponent: white.name.clone(),
                });
                white.send(Message::GameStart {
                    room: self.id.clone(),
                    side: Piece::White,
                    opponent: black.name.clone(),
                });
            }
            Piece::Empty => unreachable!("seats are black or white"),
        }

        Ok(side)
    }

    /// Relays a placement to both participants.
    ///
    /// The sender is included so that both ends run the identical
    /// apply-on-message path.
    pub fn broadcast_move(&self, row: usize, col: usize, piece: Piece) {
        let state = self.state.lock().unwrap();
        state.send_both(Message::Move { row, col, piece });
    }

    /// Relays a frame to the opponent of `from` (chat, surrender).
    pub fn relay_to_opponent(&self, from: Piece, msg: Message) {
        let state = self.state.lock().unwrap();
        if let Some(opponent) = state.seat(from.opposite()) {
            opponent.send(msg);
        }
    }

    /// First phase of a bilateral agreement: record the requester's flag
    /// and forward the request to the opponent. Nothing else changes
    /// until a response arrives.
    #[instrument(skip(self), fields(room = %self.id))]
    pub fn agreement_request(&self, kind: Agreement, from: Piece) {
        let mut state = self.state.lock().unwrap();
        let request = match kind {
            Agreement::Undo => {
                state.undo_votes.set(from);
                Message::UndoRequest
            }
            Agreement::Reset => {
                state.reset_votes.set(from);
                Message::ResetRequest
            }
        };
        debug!(?kind, %from, "agreement requested");
        if let Some(opponent) = state.seat(from.opposite()) {
            opponent.send(request);
        }
    }

    /// Second phase: adopt the flags reported by a participant and
    /// re-check.
    ///
    /// The payload's flags replace the room's wholesale; the room keeps
    /// no ground truth of its own beyond what the sides last reported.
    /// Both true commits: the fully agreed response is broadcast so each
    /// side applies the action to its engine, and the flags clear for
    /// the next round. Otherwise the partial state is broadcast as
    /// information.
    #[instrument(skip(self), fields(room = %self.id))]
    pub fn agreement_response(&self, kind: Agreement, black: bool, white: bool) {
        let mut state = self.state.lock().unwrap();
        let votes = Votes { black, white };
        let agreed = votes.both();
        match kind {
            Agreement::Undo => state.undo_votes = if agreed { Votes::default() } else { votes },
            Agreement::Reset => state.reset_votes = if agreed { Votes::default() } else { votes },
        }
        let response = match kind {
            Agreement::Undo => Message::UndoResponse { black, white },
            Agreement::Reset => Message::ResetResponse { black, white },
        };
        if agreed {
            info!(?kind, "both sides agreed");
        } else {
            debug!(?kind, black, white, "partial agreement");
        }
        state.send_both(response);
    }

    /// Unseats a participant.
    ///
    /// The survivor, if any, is told the opponent left and is unseated
    /// as well: the match is abandoned, not paused. Pending agreement
    /// flags are discarded. Returns true when the room is now empty and
    /// should be dropped from the registry.
    #[instrument(skip(self), fields(room = %self.id))]
    pub fn remove_participant(&self, conn: ConnId) -> bool {
        let mut state = self.state.lock().unwrap();

        let side = if state.black.as_ref().is_some_and(|p| p.conn == conn) {
            Piece::Black
        } else if state.white.as_ref().is_some_and(|p| p.conn == conn) {
            Piece::White
        } else {
            return state.black.is_none() && state.white.is_none();
        };

        match side {
            Piece::Black => state.black = None,
            Piece::White => state.white = None,
            Piece::Empty => {}
        }
        state.status = RoomStatus::Waiting;
        state.undo_votes = Votes::default();
        state.reset_votes = Votes::default();

        let survivor = match side.opposite() {
            Piece::Black => state.black.take(),
            Piece::White => state.white.take(),
            Piece::Empty => None,
        };
        if let Some(survivor) = survivor {
            info!(survivor = %survivor.name, "notifying survivor, abandoning match");
            survivor.send(Message::Disconnect {
                reason: "opponent left the room".into(),
            });
        }

        state.black.is_none() && state.white.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(
        room: &Room,
        conn: ConnId,
        name: &str,
    ) -> (Piece, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let side = room.add_participant(conn, name.into(), tx).unwrap();
        (side, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn test_first_arrival_is_black_and_waits() {
        let room = Room::new("r1");
        let (side, mut rx) = seat(&room, 1, "alice");
        assert_eq!(side, Piece::Black);
        assert_eq!(room.status(), RoomStatus::Waiting);
        let msgs = drain(&mut rx);
        assert!(matches!(msgs[0], Message::RoomJoined { side: Piece::Black, .. }));
        assert!(matches!(msgs[1], Message::RoomInfo { .. }));
    }

    #[test]
    fn test_second_arrival_starts_game_for_both() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (side_b, mut rx_b) = seat(&room, 2, "bob");
        assert_eq!(side_b, Piece::White);
        assert_eq!(room.status(), RoomStatus::Active);

        let start_a = drain(&mut rx_a).pop().unwrap();
        assert_eq!(
            start_a,
            Message::GameStart {
                room: "r1".into(),
                side: Piece::Black,
                opponent: "bob".into()
            }
        );
        let start_b = drain(&mut rx_b).pop().unwrap();
        assert_eq!(
            start_b,
            Message::GameStart {
                room: "r1".into(),
                side: Piece::White,
                opponent: "alice".into()
            }
        );
    }

    #[test]
    fn test_third_arrival_rejected() {
        let room = Room::new("r1");
        let _a = seat(&room, 1, "alice");
        let _b = seat(&room, 2, "bob");
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(room.add_participant(3, "carol".into(), tx).is_err());
        assert!(!room.is_joinable());
    }

    #[test]
    fn test_move_broadcast_reaches_both() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        room.broadcast_move(7, 7, Piece::Black);
        let expected = Message::Move {
            row: 7,
            col: 7,
            piece: Piece::Black,
        };
        assert_eq!(drain(&mut rx_a), vec![expected.clone()]);
        assert_eq!(drain(&mut rx_b), vec![expected]);
    }

    #[test]
    fn test_chat_goes_to_opponent_only() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        room.relay_to_opponent(Piece::Black, Message::Chat { text: "hi".into() });
        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(drain(&mut rx_b), vec![Message::Chat { text: "hi".into() }]);
    }

    #[test]
    fn test_agreement_request_forwards_to_opponent_only() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        room.agreement_request(Agreement::Reset, Piece::Black);
        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(drain(&mut rx_b), vec![Message::ResetRequest]);
    }

    #[test]
    fn test_two_requests_alone_do_not_commit() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        // Both sides request; each request carries only its own flag.
        room.agreement_request(Agreement::Reset, Piece::Black);
        room.agreement_request(Agreement::Reset, Piece::White);

        // Requests forward, but nothing commits without a both-true
        // response.
        assert_eq!(drain(&mut rx_a), vec![Message::ResetRequest]);
        assert_eq!(drain(&mut rx_b), vec![Message::ResetRequest]);
    }

    #[test]
    fn test_partial_response_informs_without_commit() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        room.agreement_response(Agreement::Reset, true, false);
        let partial = Message::ResetResponse {
            black: true,
            white: false,
        };
        assert_eq!(drain(&mut rx_a), vec![partial.clone()]);
        assert_eq!(drain(&mut rx_b), vec![partial]);
    }

    #[test]
    fn test_full_response_commits_and_clears() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        room.agreement_response(Agreement::Reset, true, true);
        let commit = Message::ResetResponse {
            black: true,
            white: true,
        };
        assert_eq!(drain(&mut rx_a), vec![commit.clone()]);
        assert_eq!(drain(&mut rx_b), vec![commit]);

        // Flags cleared: a later partial response starts from scratch.
        room.agreement_response(Agreement::Reset, false, true);
        assert_eq!(
            drain(&mut rx_a),
            vec![Message::ResetResponse {
                black: false,
                white: true
            }]
        );
    }

    #[test]
    fn test_undo_and_reset_flags_are_independent() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        room.agreement_request(Agreement::Undo, Piece::Black);
        assert_eq!(drain(&mut rx_b), vec![Message::UndoRequest]);

        // A reset response must not see the undo flag.
        room.agreement_response(Agreement::Reset, false, false);
        assert_eq!(
            drain(&mut rx_a),
            vec![Message::ResetResponse {
                black: false,
                white: false
            }]
        );
    }

    #[test]
    fn test_departure_notifies_and_unseats_survivor() {
        let room = Room::new("r1");
        let (_, mut rx_a) = seat(&room, 1, "alice");
        let (_, mut rx_b) = seat(&room, 2, "bob");
        drain(&mut rx_a);
        drain(&mut rx_b);

        // Black leaves; white is notified and evicted; room is empty.
        assert!(room.remove_participant(1));
        assert!(matches!(
            drain(&mut rx_b).as_slice(),
            [Message::Disconnect { .. }]
        ));
        assert_eq!(room.seat_of(2), None);
        assert_eq!(room.status(), RoomStatus::Waiting);
    }

    #[test]
    fn test_departure_from_waiting_room_empties_it() {
        let room = Room::new("r1");
        let _a = seat(&room, 1, "alice");
        assert!(room.remove_participant(1));
    }

    #[test]
    fn test_remove_unknown_conn_is_noop() {
        let room = Room::new("r1");
        let _a = seat(&room, 1, "alice");
        assert!(!room.remove_participant(99));
        assert_eq!(room.seat_of(1), Some(Piece::Black));
    }

    #[test]
    fn test_seat_of_tracks_assignment() {
        let room = Room::new("r1");
        let _a = seat(&room, 1, "alice");
        let _b = seat(&room, 2, "bob");
        assert_eq!(room.seat_of(1), Some(Piece::Black));
        assert_eq!(room.seat_of(2), Some(Piece::White));
        assert_eq!(room.seat_of(3), None);
    }
}

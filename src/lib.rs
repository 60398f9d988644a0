//! Gomoku library - five-in-a-row engine and two-player relay server.
//!
//! # Architecture
//!
//! - **Game**: the authoritative engine (board, turn order, move
//!   history, win/draw detection) with synchronous observer
//!   notifications
//! - **Players**: move providers (local input, heuristic opponent,
//!   remote peer) driven by an orchestrator loop
//! - **Net**: the session layer (wire protocol, rooms, registry,
//!   per-connection handlers) that keeps two remote engines in sync
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gomoku::{RelayServer, RoomRegistry, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registry = Arc::new(RoomRegistry::new());
//! let server = RelayServer::bind(&ServerConfig::default(), registry).await?;
//! server.serve().await
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod game;
mod net;
mod orchestrator;
mod players;

// Crate-level exports - Game engine
pub use game::{
    BOARD_SIZE, Board, CELL_COUNT, Game, GameListener, GameStatus, Move, Outcome, Piece,
    WIN_LENGTH, rules,
};

// Crate-level exports - Move providers
pub use orchestrator::Orchestrator;
pub use players::{HeuristicSource, LocalSource, MoveSource, RemoteSource};

// Crate-level exports - Network session layer
pub use net::{
    ANY_ROOM, Agreement, ConnId, Connection, Message, ProtocolError, RelayServer, Room, RoomFull,
    RoomRegistry, RoomStatus, ServerConfig, decode, encode, run_connection,
};

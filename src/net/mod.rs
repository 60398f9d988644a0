//! Network session layer: wire protocol, rooms, registry, and the
//! per-connection handlers.

mod client;
mod handler;
mod protocol;
mod registry;
mod room;
mod server;

pub use client::Connection;
pub use handler::run as run_connection;
pub use protocol::{ANY_ROOM, Message, ProtocolError, decode, encode};
pub use registry::RoomRegistry;
pub use room::{Agreement, ConnId, Room, RoomFull, RoomStatus};
pub use server::{RelayServer, ServerConfig};

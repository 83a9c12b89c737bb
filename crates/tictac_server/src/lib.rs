//! Two-player tic-tac-toe rooms over WebSocket.
//!
//! # Architecture
//!
//! - **Room codes**: four-symbol, collision-free, easy to read aloud
//! - **Lobby**: room registry plus connection-to-room bindings
//! - **Session**: protocol dispatcher, replies and broadcasts
//! - **Transport**: axum WebSocket endpoint, health check, static files
//!
//! Game rules live in [`tictac_engine`]. All room mutation goes through a
//! single [`SharedSession`] lock, so two players racing to act on the same
//! room are processed one after the other.
//!
//! # Example
//!
//! ```
//! use tictac_server::{ConnectionId, Lobby, RoomStatus};
//!
//! let mut lobby = Lobby::new();
//! let code = lobby.create_room(ConnectionId::from(1)).unwrap();
//! lobby.join_room(ConnectionId::from(2), &code).unwrap();
//! assert_eq!(lobby.room(&code).unwrap().status(), RoomStatus::Playing);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod connection;
mod error;
mod lobby;
pub mod protocol;
mod room;
pub mod room_code;
mod session;
mod transport;

pub use config::{ConfigError, ServerConfig};
pub use connection::{ConnectionId, ConnectionIds};
pub use error::RoomError;
pub use lobby::{Departure, Lobby};
pub use protocol::{ClientMessage, GameSnapshot, ServerMessage};
pub use room::{Phase, Room, RoomStatus, Seats};
pub use room_code::RoomCode;
pub use session::{Mailbox, Session, SharedSession};
pub use transport::{AppState, HEALTH_BODY, HEALTH_PATH, WS_PATH, router, serve};

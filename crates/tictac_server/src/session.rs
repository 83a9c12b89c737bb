//! Session protocol handler: turns inbound frames into lobby operations,
//! replies and broadcasts.

use crate::protocol::{
    ClientMessage, FrameError, GameSnapshot, ServerMessage, move_index, parse_frame,
};
use crate::{ConnectionId, Departure, Lobby, RoomCode, RoomError};
use std::collections::HashMap;
use std::sync::Arc;
use tictac_engine::Mark;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

/// Outbound queue of one connection. The transport drains it.
pub type Mailbox = mpsc::UnboundedSender<ServerMessage>;

/// The session behind the lock that serialises all room mutation.
pub type SharedSession = Arc<Mutex<Session>>;

/// Lobby state plus the mailbox of every live connection.
///
/// All methods run to completion without awaiting, so holding the
/// [`SharedSession`] lock for one call processes exactly one event.
#[derive(Debug)]
pub struct Session {
    lobby: Lobby,
    mailboxes: HashMap<ConnectionId, Mailbox>,
    dropped: Vec<ConnectionId>,
}

impl Session {
    /// Wraps a lobby.
    pub fn new(lobby: Lobby) -> Self {
        Self {
            lobby,
            mailboxes: HashMap::new(),
            dropped: Vec::new(),
        }
    }

    /// Wraps a lobby behind the shared lock.
    pub fn shared(lobby: Lobby) -> SharedSession {
        Arc::new(Mutex::new(Self::new(lobby)))
    }

    /// Read access to rooms and bindings.
    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.mailboxes.len()
    }

    /// Registers a new connection and greets it.
    #[instrument(skip(self, mailbox))]
    pub fn connect(&mut self, conn: ConnectionId, mailbox: Mailbox) {
        self.mailboxes.insert(conn, mailbox);
        info!(connections = self.mailboxes.len(), "Connection opened");
        self.send(conn, ServerMessage::hello());
        self.reap();
    }

    /// Handles one inbound text frame from `conn`.
    #[instrument(skip(self, text))]
    pub fn dispatch(&mut self, conn: ConnectionId, text: &str) {
        debug!(frame = text, "Inbound frame");
        let result = match parse_frame(text) {
            Ok(message) => self.handle(conn, message),
            Err(FrameError::UnknownType(kind)) => {
                debug!(kind, "Unrecognised frame type, echoing");
                self.send(
                    conn,
                    ServerMessage::Echo {
                        data: text.to_string(),
                    },
                );
                Ok(())
            }
            Err(FrameError::Malformed) => Err(RoomError::InvalidMessageFormat),
        };
        if let Err(err) = result {
            warn!(error = %err, "Rejected client action");
            self.send(conn, ServerMessage::error(err));
        }
        self.reap();
    }

    /// Answers a frame that never reached the parser, such as a binary frame.
    #[instrument(skip(self))]
    pub fn reject(&mut self, conn: ConnectionId, err: RoomError) {
        warn!(error = %err, "Rejected frame");
        self.send(conn, ServerMessage::error(err));
        self.reap();
    }

    /// Forgets `conn` and vacates its seat, as an implicit `leave_room`.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self, conn: ConnectionId) {
        self.drop_connection(conn);
        self.reap();
    }

    fn handle(&mut self, conn: ConnectionId, message: ClientMessage) -> Result<(), RoomError> {
        match message {
            ClientMessage::CreateGame => {
                let room_id = self.lobby.create_room(conn)?;
                self.send(
                    conn,
                    ServerMessage::GameCreated {
                        room_id,
                        player: Mark::X,
                    },
                );
            }
            ClientMessage::JoinGame { room_id } => {
                let code = RoomCode::normalize(&room_id);
                let player = self.lobby.join_room(conn, &code)?;
                self.send(
                    conn,
                    ServerMessage::GameJoined {
                        room_id: code.clone(),
                        player,
                    },
                );
                self.broadcast_state(&code);
            }
            ClientMessage::MakeMove { room_id, index } => {
                let code = RoomCode::normalize(&room_id);
                let report = self.lobby.make_move(conn, &code, move_index(&index))?;
                if let Some(winner) = report.winner {
                    info!(room = %code, winner = winner.as_str(), "Game over");
                }
                self.broadcast_state(&code);
            }
            ClientMessage::PlayAgain { room_id } => {
                let code = RoomCode::normalize(&room_id);
                self.lobby.play_again(conn, &code)?;
                self.broadcast_state(&code);
            }
            ClientMessage::LeaveRoom { room_id } => {
                let code = RoomCode::normalize(&room_id);
                let departure = self.lobby.leave_named(conn, &code)?;
                self.announce(departure);
            }
        }
        Ok(())
    }

    /// Tells the remaining player (if any) the room is back to waiting and
    /// that the opponent is gone.
    fn announce(&mut self, departure: Departure) {
        let Some(remaining) = departure.remaining else {
            return;
        };
        self.broadcast_state(&departure.code);
        self.send(
            remaining,
            ServerMessage::OpponentLeft {
                room_id: departure.code,
            },
        );
    }

    fn broadcast_state(&mut self, code: &RoomCode) {
        let Some(room) = self.lobby.room(code) else {
            return;
        };
        let snapshot = GameSnapshot::from(room);
        let occupants: Vec<_> = room.seats().occupants().collect();
        debug!(room = %code, status = %snapshot.status, "Broadcasting state");
        for conn in occupants {
            self.send(conn, ServerMessage::GameState(snapshot.clone()));
        }
    }

    fn send(&mut self, conn: ConnectionId, message: ServerMessage) {
        let Some(mailbox) = self.mailboxes.get(&conn) else {
            debug!(%conn, "No mailbox, dropping frame");
            return;
        };
        if mailbox.send(message).is_err() {
            warn!(%conn, "Mailbox closed, treating as disconnect");
            self.dropped.push(conn);
        }
    }

    fn drop_connection(&mut self, conn: ConnectionId) {
        if self.mailboxes.remove(&conn).is_some() {
            info!(%conn, connections = self.mailboxes.len(), "Connection closed");
        }
        if let Some(departure) = self.lobby.leave_room(conn) {
            self.announce(departure);
        }
    }

    /// Disconnects every connection whose mailbox turned out to be closed.
    fn reap(&mut self) {
        while let Some(conn) = self.dropped.pop() {
            self.drop_connection(conn);
        }
    }
}

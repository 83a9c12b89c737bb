//! Room registry and connection tracker.

use crate::room_code::generate_room_code;
use crate::{ConnectionId, Room, RoomCode, RoomError};
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use tictac_engine::{Mark, MoveReport};
use tracing::{debug, info, instrument, warn};

/// What happened when a connection left its room.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Departure {
    /// Room that was left.
    pub code: RoomCode,
    /// Seat the leaver held.
    pub vacated: Mark,
    /// Player still seated, if any.
    pub remaining: Option<ConnectionId>,
}

impl Departure {
    /// True when nobody is left and the room was deleted.
    pub fn room_deleted(&self) -> bool {
        self.remaining.is_none()
    }
}

/// Every live room plus the connection-to-room bindings.
///
/// A connection is bound to at most one room. Rooms are deleted the moment
/// their last seat empties.
#[derive(Debug)]
pub struct Lobby {
    rooms: HashMap<RoomCode, Room>,
    bindings: HashMap<ConnectionId, RoomCode>,
    rng: StdRng,
}

impl Lobby {
    /// Creates an empty lobby seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates an empty lobby with a caller-supplied code generator.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rooms: HashMap::new(),
            bindings: HashMap::new(),
            rng,
        }
    }

    /// Looks up a room.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Room `conn` is bound to.
    pub fn room_of(&self, conn: ConnectionId) -> Option<&RoomCode> {
        self.bindings.get(&conn)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Opens a room with `owner` as `X`.
    #[instrument(skip(self), fields(rooms = self.rooms.len()))]
    pub fn create_room(&mut self, owner: ConnectionId) -> Result<RoomCode, RoomError> {
        self.ensure_unbound(owner)?;
        let rooms = &self.rooms;
        let code = generate_room_code(&mut self.rng, |code| rooms.contains_key(code));
        self.rooms.insert(code.clone(), Room::new(code.clone(), owner));
        self.bindings.insert(owner, code.clone());
        info!(room = %code, "Room created");
        Ok(code)
    }

    /// Seats `conn` in the room's open seat.
    #[instrument(skip(self))]
    pub fn join_room(&mut self, conn: ConnectionId, code: &RoomCode) -> Result<Mark, RoomError> {
        self.ensure_unbound(conn)?;
        let room = self.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        let mark = room.join(conn)?;
        self.bindings.insert(conn, code.clone());
        Ok(mark)
    }

    /// Unbinds `conn` from whatever room it is in. `None` when unbound.
    #[instrument(skip(self))]
    pub fn leave_room(&mut self, conn: ConnectionId) -> Option<Departure> {
        let code = self.bindings.remove(&conn)?;
        let Some(room) = self.rooms.get_mut(&code) else {
            warn!(room = %code, "Binding pointed at a missing room");
            return None;
        };
        let Some(vacated) = room.leave(conn) else {
            warn!(room = %code, "Bound connection held no seat");
            return None;
        };
        let remaining = room.seats().occupants().next();
        if remaining.is_none() {
            self.rooms.remove(&code);
            info!(room = %code, "Room emptied and deleted");
        }
        Some(Departure::new(code, vacated, remaining))
    }

    /// Explicit `leave_room` for a named room; only its players may leave it.
    #[instrument(skip(self))]
    pub fn leave_named(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
    ) -> Result<Departure, RoomError> {
        if self.bindings.get(&conn) != Some(code) {
            return Err(RoomError::NotAPlayer);
        }
        self.leave_room(conn).ok_or(RoomError::NotAPlayer)
    }

    /// Plays `conn`'s mark at `index` in the named room.
    #[instrument(skip(self))]
    pub fn make_move(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
        index: Option<usize>,
    ) -> Result<MoveReport, RoomError> {
        let (room, player) = self.seated(conn, code)?;
        let report = room.apply_move(player, index)?;
        debug!(room = %code, player = %player, index = report.index, "Move accepted");
        Ok(report)
    }

    /// Rematch in the named room after the game ended.
    #[instrument(skip(self))]
    pub fn play_again(&mut self, conn: ConnectionId, code: &RoomCode) -> Result<(), RoomError> {
        let (room, _) = self.seated(conn, code)?;
        room.restart()
    }

    fn seated(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
    ) -> Result<(&mut Room, Mark), RoomError> {
        let room = self.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        let player = room.seats().seat_of(conn).ok_or(RoomError::NotAPlayer)?;
        Ok((room, player))
    }

    fn ensure_unbound(&self, conn: ConnectionId) -> Result<(), RoomError> {
        if self.bindings.contains_key(&conn) {
            return Err(RoomError::AlreadyInRoom);
        }
        Ok(())
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

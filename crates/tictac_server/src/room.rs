//! A single two-seat room and its lifecycle.

use crate::{ConnectionId, RoomCode, RoomError};
use serde::Serialize;
use tictac_engine::{Game, GameStatus, Mark, MoveError, MoveReport};
use tracing::{debug, info, instrument};

/// Externally visible room lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoomStatus {
    /// At most one seat filled; no board.
    Waiting,
    /// Both seats filled and moves are accepted.
    Playing,
    /// Game over, waiting for `play_again` or a departure.
    Ended,
}

/// The two seats of a room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seats {
    x: Option<ConnectionId>,
    o: Option<ConnectionId>,
}

impl Seats {
    /// Who sits in `mark`'s seat.
    pub fn occupant(&self, mark: Mark) -> Option<ConnectionId> {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }

    /// Which seat `conn` holds, if any.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<Mark> {
        if self.x == Some(conn) {
            Some(Mark::X)
        } else if self.o == Some(conn) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Every seated connection, `X` first.
    pub fn occupants(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.x.iter().chain(self.o.iter()).copied()
    }

    /// Both seats taken.
    pub fn is_full(&self) -> bool {
        self.x.is_some() && self.o.is_some()
    }

    /// No seat taken.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.o.is_none()
    }

    fn slot(&mut self, mark: Mark) -> &mut Option<ConnectionId> {
        match mark {
            Mark::X => &mut self.x,
            Mark::O => &mut self.o,
        }
    }
}

/// Whether a game exists. Board, turn and winner only exist while a game does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Not enough players.
    Waiting,
    /// A game is running or has just ended.
    Active(Game),
}

/// A room: code, seats, and the game between the seated players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    code: RoomCode,
    seats: Seats,
    phase: Phase,
}

impl Room {
    /// Opens a room with `owner` in seat `X`.
    #[instrument(fields(room = %code, owner = %owner))]
    pub fn new(code: RoomCode, owner: ConnectionId) -> Self {
        Self {
            code,
            seats: Seats {
                x: Some(owner),
                o: None,
            },
            phase: Phase::Waiting,
        }
    }

    /// Room code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Seat assignments.
    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    /// The running game, if any.
    pub fn game(&self) -> Option<&Game> {
        match &self.phase {
            Phase::Waiting => None,
            Phase::Active(game) => Some(game),
        }
    }

    /// Lifecycle derived from the phase.
    pub fn status(&self) -> RoomStatus {
        match &self.phase {
            Phase::Waiting => RoomStatus::Waiting,
            Phase::Active(game) if game.status() == GameStatus::Ended => RoomStatus::Ended,
            Phase::Active(_) => RoomStatus::Playing,
        }
    }

    /// Seats `conn` as `O` and starts play once both seats are filled.
    /// Only seat `O` is ever offered to a joiner.
    #[instrument(skip(self), fields(room = %self.code))]
    pub fn join(&mut self, conn: ConnectionId) -> Result<Mark, RoomError> {
        if self.seats.o.is_some() {
            return Err(RoomError::RoomFull);
        }
        self.seats.o = Some(conn);
        self.settle();
        info!(player = %Mark::O, status = %self.status(), "Player seated");
        Ok(Mark::O)
    }

    /// Clears whichever seat `conn` held.
    #[instrument(skip(self), fields(room = %self.code))]
    pub fn leave(&mut self, conn: ConnectionId) -> Option<Mark> {
        let mark = self.seats.seat_of(conn)?;
        *self.seats.slot(mark) = None;
        self.settle();
        info!(player = %mark, status = %self.status(), "Seat vacated");
        Some(mark)
    }

    /// Applies a move for `player`. `index` is `None` when the client sent
    /// something that is not a non-negative integer.
    pub fn apply_move(
        &mut self,
        player: Mark,
        index: Option<usize>,
    ) -> Result<MoveReport, RoomError> {
        let Phase::Active(game) = &mut self.phase else {
            return Err(MoveError::GameNotActive.into());
        };
        let Some(index) = index else {
            game.ensure_turn(player)?;
            return Err(MoveError::InvalidIndex.into());
        };
        Ok(game.apply_move(player, index)?)
    }

    /// Starts a fresh game after the previous one ended.
    #[instrument(skip(self), fields(room = %self.code))]
    pub fn restart(&mut self) -> Result<(), RoomError> {
        match &mut self.phase {
            Phase::Active(game) if game.status() == GameStatus::Ended => {
                game.reset();
                info!("Rematch started");
                Ok(())
            }
            Phase::Active(_) => Err(RoomError::GameNotFinished),
            Phase::Waiting => Err(MoveError::GameNotActive.into()),
        }
    }

    /// Re-derives the phase from seat occupancy. Called after every
    /// membership change: two seated players means a game, anything less
    /// means waiting with no board.
    fn settle(&mut self) {
        let active = matches!(self.phase, Phase::Active(_));
        match (active, self.seats.is_full()) {
            (false, true) => {
                debug!(room = %self.code, "Both seats filled, starting game");
                self.phase = Phase::Active(Game::new());
            }
            (true, false) => {
                debug!(room = %self.code, "Seat emptied, clearing board");
                self.phase = Phase::Waiting;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_engine::Outcome;

    fn code() -> RoomCode {
        RoomCode::normalize("ABCD")
    }

    fn full_room() -> Room {
        let mut room = Room::new(code(), ConnectionId::from(1));
        room.join(ConnectionId::from(2)).unwrap();
        room
    }

    #[test]
    fn test_new_room_waits_with_owner_as_x() {
        let room = Room::new(code(), ConnectionId::from(1));
        assert_eq!(room.status(), RoomStatus::Waiting);
        assert_eq!(room.seats().occupant(Mark::X), Some(ConnectionId::from(1)));
        assert_eq!(room.seats().occupant(Mark::O), None);
        assert!(room.game().is_none());
    }

    #[test]
    fn test_join_starts_game() {
        let room = full_room();
        assert_eq!(room.status(), RoomStatus::Playing);
        assert_eq!(room.game().map(Game::turn), Some(Mark::X));
    }

    #[test]
    fn test_third_player_rejected() {
        let mut room = full_room();
        assert_eq!(room.join(ConnectionId::from(3)), Err(RoomError::RoomFull));
    }

    #[test]
    fn test_leave_during_play_clears_game() {
        let mut room = full_room();
        room.apply_move(Mark::X, Some(4)).unwrap();
        assert_eq!(room.leave(ConnectionId::from(1)), Some(Mark::X));
        assert_eq!(room.status(), RoomStatus::Waiting);
        assert!(room.game().is_none());
    }

    #[test]
    fn test_vacated_x_is_not_offered() {
        let mut room = full_room();
        room.leave(ConnectionId::from(1));
        assert_eq!(room.join(ConnectionId::from(3)), Err(RoomError::RoomFull));
        assert_eq!(room.seats().occupant(Mark::X), None);
        assert_eq!(room.seats().occupant(Mark::O), Some(ConnectionId::from(2)));
        assert_eq!(room.status(), RoomStatus::Waiting);
    }

    #[test]
    fn test_vacated_o_is_refilled() {
        let mut room = full_room();
        room.leave(ConnectionId::from(2));
        assert_eq!(room.join(ConnectionId::from(3)), Ok(Mark::O));
        assert_eq!(room.status(), RoomStatus::Playing);
    }

    #[test]
    fn test_move_while_waiting_is_not_active() {
        let mut room = Room::new(code(), ConnectionId::from(1));
        assert_eq!(
            room.apply_move(Mark::X, Some(0)),
            Err(RoomError::Move(MoveError::GameNotActive))
        );
    }

    #[test]
    fn test_non_integer_index_checked_after_turn() {
        let mut room = full_room();
        assert_eq!(
            room.apply_move(Mark::O, None),
            Err(RoomError::Move(MoveError::NotPlayerTurn))
        );
        assert_eq!(
            room.apply_move(Mark::X, None),
            Err(RoomError::Move(MoveError::InvalidIndex))
        );
    }

    #[test]
    fn test_restart_only_after_end() {
        let mut room = full_room();
        assert_eq!(room.restart(), Err(RoomError::GameNotFinished));
        let script = [
            (Mark::X, 0),
            (Mark::O, 3),
            (Mark::X, 1),
            (Mark::O, 4),
            (Mark::X, 2),
        ];
        for (mark, index) in script {
            room.apply_move(mark, Some(index)).unwrap();
        }
        assert_eq!(room.status(), RoomStatus::Ended);
        assert_eq!(
            room.game().and_then(Game::winner),
            Some(Outcome::Winner(Mark::X))
        );
        room.restart().unwrap();
        assert_eq!(room.status(), RoomStatus::Playing);
        assert_eq!(room.game(), Some(&Game::new()));
    }
}

//! Client-facing error taxonomy.

use derive_more::{Display, Error, From};
use tictac_engine::MoveError;

/// Why a client action was rejected.
///
/// Every variant is a client-input problem. The `Display` text is sent back
/// verbatim in an `error` frame, and the rejected action leaves room and
/// connection state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum RoomError {
    /// The connection already sits in a room.
    #[display("You are already in a room.")]
    AlreadyInRoom,

    /// No live room has that code.
    #[display("Room not found.")]
    RoomNotFound,

    /// Both seats are taken.
    #[display("Room is full.")]
    RoomFull,

    /// The connection holds neither seat of the named room.
    #[display("You are not a player in this room.")]
    NotAPlayer,

    /// `play_again` before the current game ended.
    #[display("Game is still in progress.")]
    GameNotFinished,

    /// Not JSON, no string `type`, or a known type with a malformed body.
    #[display("Invalid message format.")]
    InvalidMessageFormat,

    /// The engine refused the move.
    #[display("{_0}")]
    #[from]
    Move(MoveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_protocol() {
        assert_eq!(RoomError::RoomFull.to_string(), "Room is full.");
        assert_eq!(RoomError::RoomNotFound.to_string(), "Room not found.");
        assert_eq!(
            RoomError::InvalidMessageFormat.to_string(),
            "Invalid message format."
        );
        assert_eq!(
            RoomError::from(MoveError::NotPlayerTurn).to_string(),
            "Not your turn."
        );
    }
}

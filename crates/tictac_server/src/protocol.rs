//! Wire protocol: JSON text frames tagged by a string `type` field.

use crate::{Room, RoomCode, RoomStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tictac_engine::{Board, GameStatus, Mark, Outcome};
use tracing::instrument;

/// Frame types a client may send.
const CLIENT_TYPES: [&str; 5] = [
    "create_game",
    "join_game",
    "make_move",
    "play_again",
    "leave_room",
];

/// Greeting text sent on connect.
pub const HELLO_MESSAGE: &str = "connected";

/// A frame sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Open a new room and take seat `X`.
    CreateGame,
    /// Take the open seat in a room.
    JoinGame {
        /// Code as typed by the user.
        room_id: String,
    },
    /// Place a mark. `index` is kept raw so a bad value is reported as an
    /// invalid index, not as a malformed frame.
    MakeMove {
        /// Room the move is for.
        room_id: String,
        /// Target cell.
        #[serde(default)]
        index: Value,
    },
    /// Rematch after the game ended.
    PlayAgain {
        /// Room to restart.
        room_id: String,
    },
    /// Vacate the seat.
    LeaveRoom {
        /// Room to leave.
        room_id: String,
    },
}

/// Why an inbound frame could not be turned into a [`ClientMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Not JSON, no string `type`, or a known type with a bad body.
    Malformed,
    /// Well-formed, but the `type` is not one we handle.
    UnknownType(String),
}

/// Parses one text frame.
#[instrument(skip(text), fields(len = text.len()))]
pub fn parse_frame(text: &str) -> Result<ClientMessage, FrameError> {
    let value: Value = serde_json::from_str(text).map_err(|_| FrameError::Malformed)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(FrameError::Malformed)?;
    if !CLIENT_TYPES.contains(&kind) {
        return Err(FrameError::UnknownType(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|_| FrameError::Malformed)
}

/// Reads a board index from a raw JSON value. Integral numbers only;
/// `3.0` counts, `3.5`, `-1` and `"3"` do not.
pub fn move_index(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let n = value.as_f64()?;
    (n.fract() == 0.0 && n >= 0.0 && n <= usize::MAX as f64).then_some(n as usize)
}

/// Full room state as broadcast to both seats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Room code.
    pub room_id: RoomCode,
    /// Nine cells; all empty while waiting.
    pub board: Board,
    /// Mark to move; `null` unless playing.
    pub turn: Option<Mark>,
    /// Room lifecycle.
    pub status: RoomStatus,
    /// `X`, `O`, `draw`, or `null`.
    pub winner: Option<Outcome>,
}

impl From<&Room> for GameSnapshot {
    fn from(room: &Room) -> Self {
        let game = room.game();
        Self {
            room_id: room.code().clone(),
            board: game.map(|g| g.board().clone()).unwrap_or_default(),
            turn: game
                .filter(|g| g.status() == GameStatus::Playing)
                .map(|g| g.turn()),
            status: room.status(),
            winner: game.and_then(|g| g.winner()),
        }
    }
}

/// A frame sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Greeting on connect.
    Hello {
        /// Always [`HELLO_MESSAGE`].
        message: String,
    },
    /// Room opened; reply to the creator only.
    GameCreated {
        /// New room code.
        room_id: RoomCode,
        /// Always `X`.
        player: Mark,
    },
    /// Seat taken; reply to the joiner only.
    GameJoined {
        /// Room joined.
        room_id: RoomCode,
        /// Seat assigned.
        player: Mark,
    },
    /// Room state broadcast.
    GameState(GameSnapshot),
    /// Rejected action; sent to the offender only.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// The other player left or dropped.
    OpponentLeft {
        /// Room the opponent left.
        room_id: RoomCode,
    },
    /// Diagnostic reply to a frame with an unknown `type`.
    Echo {
        /// The raw frame.
        data: String,
    },
}

impl ServerMessage {
    /// Greeting sent to every new connection.
    pub fn hello() -> Self {
        Self::Hello {
            message: HELLO_MESSAGE.to_string(),
        }
    }

    /// Error frame carrying `err`'s display text.
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConnectionId;
    use serde_json::json;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(
            parse_frame(r#"{"type":"create_game"}"#),
            Ok(ClientMessage::CreateGame)
        );
        assert_eq!(
            parse_frame(r#"{"type":"join_game","roomId":"AB23"}"#),
            Ok(ClientMessage::JoinGame {
                room_id: "AB23".into()
            })
        );
        assert_eq!(
            parse_frame(r#"{"type":"make_move","roomId":"AB23","index":4}"#),
            Ok(ClientMessage::MakeMove {
                room_id: "AB23".into(),
                index: json!(4)
            })
        );
    }

    #[test]
    fn test_missing_or_non_string_type_is_malformed() {
        for frame in ["ping", "{}", r#"{"type":7}"#, r#"{"type":null}"#, "[1,2]"] {
            assert_eq!(parse_frame(frame), Err(FrameError::Malformed), "{frame}");
        }
    }

    #[test]
    fn test_known_type_with_bad_body_is_malformed() {
        assert_eq!(
            parse_frame(r#"{"type":"join_game"}"#),
            Err(FrameError::Malformed)
        );
        assert_eq!(
            parse_frame(r#"{"type":"play_again","roomId":12}"#),
            Err(FrameError::Malformed)
        );
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            parse_frame(r#"{"type":"chat","text":"hi"}"#),
            Err(FrameError::UnknownType("chat".into()))
        );
    }

    #[test]
    fn test_missing_index_parses_as_null() {
        let parsed = parse_frame(r#"{"type":"make_move","roomId":"AB23"}"#).unwrap();
        assert_eq!(
            parsed,
            ClientMessage::MakeMove {
                room_id: "AB23".into(),
                index: Value::Null
            }
        );
    }

    #[test]
    fn test_move_index() {
        assert_eq!(move_index(&json!(0)), Some(0));
        assert_eq!(move_index(&json!(8)), Some(8));
        assert_eq!(move_index(&json!(9)), Some(9));
        assert_eq!(move_index(&json!(3.0)), Some(3));
        assert_eq!(move_index(&json!(3.5)), None);
        assert_eq!(move_index(&json!(-1)), None);
        assert_eq!(move_index(&json!("3")), None);
        assert_eq!(move_index(&Value::Null), None);
    }

    #[test]
    fn test_waiting_snapshot_shape() {
        let room = Room::new(RoomCode::normalize("AB23"), ConnectionId::from(1));
        let json =
            serde_json::to_value(ServerMessage::GameState(GameSnapshot::from(&room))).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "game_state",
                "roomId": "AB23",
                "board": ["", "", "", "", "", "", "", "", ""],
                "turn": null,
                "status": "waiting",
                "winner": null
            })
        );
    }

    #[test]
    fn test_playing_snapshot_shape() {
        let mut room = Room::new(RoomCode::normalize("AB23"), ConnectionId::from(1));
        room.join(ConnectionId::from(2)).unwrap();
        room.apply_move(Mark::X, Some(4)).unwrap();
        let json =
            serde_json::to_value(ServerMessage::GameState(GameSnapshot::from(&room))).unwrap();
        assert_eq!(json["board"][4], "X");
        assert_eq!(json["turn"], "O");
        assert_eq!(json["status"], "playing");
        assert_eq!(json["winner"], Value::Null);
    }

    #[test]
    fn test_reply_frames() {
        let created = ServerMessage::GameCreated {
            room_id: RoomCode::normalize("AB23"),
            player: Mark::X,
        };
        assert_eq!(
            serde_json::to_value(created).unwrap(),
            json!({"type": "game_created", "roomId": "AB23", "player": "X"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::hello()).unwrap(),
            json!({"type": "hello", "message": "connected"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::OpponentLeft {
                room_id: RoomCode::normalize("AB23")
            })
            .unwrap(),
            json!({"type": "opponent_left", "roomId": "AB23"})
        );
    }
}

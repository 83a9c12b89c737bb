//! Pure tic-tac-toe logic for two-player rooms.
//!
//! The engine knows nothing about connections, rooms, or transports. It
//! validates a move against a [`Game`], applies it, and settles the result
//! (win, draw, or next turn).
//!
//! # Example
//!
//! ```
//! use tictac_engine::{Game, GameStatus, Mark, Outcome};
//!
//! let mut game = Game::new();
//! for (mark, index) in [(Mark::X, 0), (Mark::O, 3), (Mark::X, 1), (Mark::O, 4), (Mark::X, 2)] {
//!     game.apply_move(mark, index).unwrap();
//! }
//! assert_eq!(game.status(), GameStatus::Ended);
//! assert_eq!(game.winner(), Some(Outcome::Winner(Mark::X)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod game;
pub mod rules;
mod types;

pub use game::{Game, MoveError, MoveReport};
pub use types::{BOARD_CELLS, Board, Cell, GameStatus, Mark, Outcome};

//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). The [`Game`](crate::Game)
//! state machine calls these after every accepted move.

pub mod draw;
pub mod win;

pub use draw::is_draw;
pub use win::{LINES, winning_line};

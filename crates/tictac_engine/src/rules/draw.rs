//! Draw detection logic for tic-tac-toe.

use super::win::winning_line;
use crate::Board;
use tracing::instrument;

/// A draw is a full board with no completed line.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    board.is_full() && winning_line(board).is_none()
}

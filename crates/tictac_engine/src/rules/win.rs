//! Win detection logic for tic-tac-toe.

use crate::{Board, Mark};
use tracing::instrument;

/// The eight winning lines: rows, then columns, then diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the first completed line and its mark, scanning [`LINES`] in order.
#[instrument(skip(board))]
pub fn winning_line(board: &Board) -> Option<(Mark, [usize; 3])> {
    LINES.into_iter().find_map(|line @ [a, b, c]| {
        let mark = board.get(a)?.mark()?;
        let same = |i| board.get(i).and_then(|cell| cell.mark()) == Some(mark);
        (same(b) && same(c)).then_some((mark, line))
    })
}

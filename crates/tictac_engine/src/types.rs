//! Core domain types for tic-tac-toe.

use serde::{Serialize, Serializer};

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// A player's mark. `X` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter)]
pub enum Mark {
    /// Player X (room creator, moves first).
    X,
    /// Player O (joiner).
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Occupied by a mark.
    Taken(Mark),
}

impl Cell {
    /// Wire label: `""`, `"X"` or `"O"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Cell::Empty => "",
            Cell::Taken(Mark::X) => "X",
            Cell::Taken(Mark::O) => "O",
        }
    }

    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Taken(mark) => Some(mark),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 3x3 board in row-major order (indices 0-8).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// True when `index` is on the board and unoccupied.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// True when every cell holds a mark.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    /// All cells.
    pub fn cells(&self) -> &[Cell; BOARD_CELLS] {
        &self.cells
    }

    /// Number of marks placed so far.
    pub fn marks_placed(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != Cell::Empty).count()
    }

    pub(crate) fn place(&mut self, index: usize, mark: Mark) {
        self.cells[index] = Cell::Taken(mark);
    }
}

/// Lifecycle of a started game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Moves are being accepted.
    Playing,
    /// Someone won or the board filled up.
    Ended,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Three in a row for this mark.
    Winner(Mark),
    /// Full board, no line.
    Draw,
}

impl Outcome {
    /// Wire label: `"X"`, `"O"` or `"draw"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Winner(Mark::X) => "X",
            Outcome::Winner(Mark::O) => "O",
            Outcome::Draw => "draw",
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_serializes_as_nine_labels() {
        let mut board = Board::new();
        board.place(0, Mark::X);
        board.place(4, Mark::O);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["X", "", "", "", "O", "", "", "", ""])
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(serde_json::to_value(Outcome::Draw).unwrap(), "draw");
        assert_eq!(serde_json::to_value(Outcome::Winner(Mark::O)).unwrap(), "O");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(GameStatus::Playing.as_ref(), "playing");
        assert_eq!(GameStatus::Ended.to_string(), "ended");
    }

    #[test]
    fn test_out_of_range_is_not_empty() {
        let board = Board::new();
        assert!(board.is_empty(8));
        assert!(!board.is_empty(9));
        assert_eq!(board.get(9), None);
    }
}

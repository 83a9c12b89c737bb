//! The per-match state machine.

use crate::rules::{is_draw, winning_line};
use crate::{BOARD_CELLS, Board, Cell, GameStatus, Mark, Outcome};
use tracing::{debug, info, instrument};

/// Error that can occur when validating a move.
///
/// The `Display` text is what the player sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The game is over (or was never started).
    #[display("Game is not active.")]
    GameNotActive,

    /// The other mark holds the turn.
    #[display("Not your turn.")]
    NotPlayerTurn,

    /// The index is not an integer in `0..=8`.
    #[display("Invalid move index.")]
    InvalidIndex,

    /// Somebody already played there.
    #[display("Square already occupied.")]
    SquareOccupied,
}

/// Summary of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// Who moved.
    pub mark: Mark,
    /// Where.
    pub index: usize,
    /// Status after the move.
    pub status: GameStatus,
    /// Set when this move finished the game.
    pub winner: Option<Outcome>,
}

/// A started game: board, turn, status and winner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    turn: Mark,
    status: GameStatus,
    winner: Option<Outcome>,
}

impl Game {
    /// Creates a fresh game with `X` to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            status: GameStatus::Playing,
            winner: None,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark to move. Only meaningful while playing.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Returns the status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the winner once the game has ended.
    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    /// Checks that the game accepts moves and that `player` holds the turn.
    pub fn ensure_turn(&self, player: Mark) -> Result<(), MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameNotActive);
        }
        if player != self.turn {
            return Err(MoveError::NotPlayerTurn);
        }
        Ok(())
    }

    /// Places `player` at `index`, then settles win, draw, or next turn.
    ///
    /// Checks run in a fixed order and the first failure wins: game active,
    /// player's turn, index in range, cell empty. A rejected move leaves the
    /// game untouched.
    #[instrument(skip(self), fields(turn = %self.turn, status = %self.status))]
    pub fn apply_move(&mut self, player: Mark, index: usize) -> Result<MoveReport, MoveError> {
        self.ensure_turn(player)?;
        if index >= BOARD_CELLS {
            return Err(MoveError::InvalidIndex);
        }
        if self.board.get(index) != Some(Cell::Empty) {
            return Err(MoveError::SquareOccupied);
        }

        self.board.place(index, player);
        self.settle();
        debug!(status = %self.status, next = %self.turn, "Move applied");

        Ok(MoveReport {
            mark: player,
            index,
            status: self.status,
            winner: self.winner,
        })
    }

    /// Starts a new round on the same game: empty board, `X` to move.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn settle(&mut self) {
        if let Some((mark, line)) = winning_line(&self.board) {
            info!(winner = %mark, ?line, "Game won");
            self.status = GameStatus::Ended;
            self.winner = Some(Outcome::Winner(mark));
        } else if is_draw(&self.board) {
            info!("Game drawn");
            self.status = GameStatus::Ended;
            self.winner = Some(Outcome::Draw);
        } else {
            self.turn = self.turn.opponent();
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

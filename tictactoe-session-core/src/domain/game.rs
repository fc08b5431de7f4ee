use crate::domain::{Board, MemberId};
use crate::protocol::Mark;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single game instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    WaitingForPlayers,
    InProgress,
    Won(Mark),
    Draw,
}

impl GameStatus {
    /// `Won` and `Draw` are sticky until an explicit reset
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won(_) | GameStatus::Draw)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            GameStatus::InProgress => write!(f, "InProgress"),
            GameStatus::Won(mark) => write!(f, "Won({})", mark),
            GameStatus::Draw => write!(f, "Draw"),
        }
    }
}

/// Whose turn it is and where the game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub current_mark: Mark,
    pub status: GameStatus,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            current_mark: Mark::X,
            status: GameStatus::WaitingForPlayers,
        }
    }
}

/// A move as broadcast on the channel, tagged with who sent it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub mark: Mark,
    pub cell: u8,
    pub player: MemberId,
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Won(Mark),
    Draw,
}

/// Result of an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Game continues with `next` to move
    Continue { next: Mark },
    Ended(GameOutcome),
}

/// Reasons a move is rejected without touching the board
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("Game is not in progress (status: {0})")]
    GameNotInProgress(GameStatus),

    #[error("It is {expected}'s turn, not {actual}'s")]
    NotYourTurn { expected: Mark, actual: Mark },

    #[error("Player {player} plays {assigned}, not {claimed}")]
    MarkMismatch {
        player: MemberId,
        assigned: Mark,
        claimed: Mark,
    },

    #[error("Cell {0} is outside the board")]
    CellOutOfRange(u8),

    #[error("Cell {0} is already occupied")]
    CellOccupied(u8),
}

/// Board, turn marker and terminal detection for one replica
///
/// The same `apply_move` runs for locally originated and received moves,
/// so two replicas fed the same accepted moves hold identical state.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStateMachine {
    board: Board,
    turn: TurnState,
    first_mark: Mark,
    history: Vec<Move>,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            board: Board::new(),
            turn: TurnState::default(),
            first_mark: Mark::X,
            history: Vec::new(),
        }
    }
}

impl GameStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Queries =====

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.turn.status
    }

    pub fn current_mark(&self) -> Mark {
        self.turn.current_mark
    }

    /// Mark that opened the current game
    pub fn first_mark(&self) -> Mark {
        self.first_mark
    }

    /// Accepted moves of the current game, oldest first
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    // ===== Transitions =====

    /// Begin a fresh game with `first_mark` to move
    pub fn start(&mut self, first_mark: Mark) {
        self.board = Board::new();
        self.history.clear();
        self.first_mark = first_mark;
        self.turn = TurnState {
            current_mark: first_mark,
            status: GameStatus::InProgress,
        };
    }

    /// Back to an empty board waiting for players
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check a move against status, turn and board without applying it
    pub fn validate(&self, mark: Mark, cell: u8) -> Result<(), MoveError> {
        if self.turn.status != GameStatus::InProgress {
            return Err(MoveError::GameNotInProgress(self.turn.status));
        }

        if mark != self.turn.current_mark {
            return Err(MoveError::NotYourTurn {
                expected: self.turn.current_mark,
                actual: mark,
            });
        }

        self.board.check_free(cell)
    }

    /// Apply a move: mark the cell, then detect win, draw or flip the turn
    pub fn apply_move(&mut self, mv: &Move) -> Result<MoveOutcome, MoveError> {
        self.validate(mv.mark, mv.cell)?;

        self.board.place(mv.cell, mv.mark)?;
        self.history.push(mv.clone());

        if let Some(winner) = self.board.winner() {
            self.turn.status = GameStatus::Won(winner);
            return Ok(MoveOutcome::Ended(GameOutcome::Won(winner)));
        }

        if self.board.is_full() {
            self.turn.status = GameStatus::Draw;
            return Ok(MoveOutcome::Ended(GameOutcome::Draw));
        }

        self.turn.current_mark = self.turn.current_mark.opponent();
        Ok(MoveOutcome::Continue {
            next: self.turn.current_mark,
        })
    }
}

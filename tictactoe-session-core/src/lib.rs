//! Replicated two-party tic-tac-toe over a broadcast channel.
//!
//! Every member runs the same deterministic state machine. Roles are derived
//! from membership, moves travel as [`GameMessage::MoveMade`], and replicas
//! converge because each applies the same validated move sequence.
//!
//! - [`protocol`]: wire messages and the JSON codec
//! - [`domain`]: board, turn rules and role arbitration
//! - [`application`]: routing of channel traffic into the domain

pub mod application;
pub mod domain;
pub mod protocol;

pub use application::{Dispatcher, Inbound, Routed};
pub use domain::{
    Board, Cell, GameOutcome, GameStateMachine, GameStatus, MemberId, Move, MoveError,
    MoveOutcome, PlayerRoles, SessionError, SessionEvent, SessionManager, TurnState,
};
pub use protocol::{decode, encode, CodecError, GameMessage, Mark, PlayedMove, CELL_COUNT};

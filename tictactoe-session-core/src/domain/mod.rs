pub mod board;
pub mod events;
pub mod game;
pub mod member;
pub mod roles;
pub mod session;

pub use board::{Board, Cell, WINNING_LINES};
pub use events::SessionEvent;
pub use game::{GameOutcome, GameStateMachine, GameStatus, Move, MoveError, MoveOutcome, TurnState};
pub use member::MemberId;
pub use roles::PlayerRoles;
pub use session::{SessionError, SessionManager};

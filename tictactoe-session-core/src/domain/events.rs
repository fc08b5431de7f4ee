use crate::domain::{Board, GameOutcome, MemberId};
use crate::protocol::Mark;
use serde::{Deserialize, Serialize};

/// Observation events for the rendering layer
///
/// Emitted in the order the transitions happened; they carry no authority
/// and are never sent over the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// An identity was bound to a mark
    RoleAssigned { member: MemberId, mark: Mark },

    /// A third (or later) identity joined and only observes
    SpectatorJoined { member: MemberId },

    /// A fresh game began
    GameStarted { first_mark: Mark },

    /// The game was discarded (partner left or a rematch was requested)
    GameReset,

    /// Board contents changed
    BoardChanged { board: Board },

    /// It is now `mark`'s turn
    TurnChanged { mark: Mark },

    /// The game reached a terminal state
    GameEnded { outcome: GameOutcome },

    /// Fewer than two players are bound
    WaitingForOpponent,

    /// Informational text from another member
    ChatReceived { from: MemberId, text: String },
}

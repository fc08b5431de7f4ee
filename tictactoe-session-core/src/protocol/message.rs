use crate::domain::MemberId;
use crate::protocol::{Mark, CELL_COUNT};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Messages broadcast between replicas
///
/// Encoded as internally tagged JSON, e.g. `{"type":"MoveMade","mark":"X","cell":4}`.
/// Tags this version does not know decode to [`GameMessage::Unknown`] and are
/// ignored by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum GameMessage {
    /// A player stamped `mark` on `cell` (0..=8, row-major)
    MoveMade { mark: Mark, cell: u8 },

    /// A replica holding a role started a game
    GameStarted {
        #[serde(rename = "firstMark")]
        first_mark: Mark,
    },

    /// A player asked for a fresh game after the previous one ended
    GameReset,

    /// Free text for display only
    Chat { text: String },

    /// A player's view of the running game, sent when someone new joins
    ///
    /// Lets a late joiner replay the moves it missed, and tells a joiner that
    /// paired itself too early who actually holds the seats.
    GameSync {
        #[serde(rename = "playerX")]
        player_x: MemberId,
        #[serde(rename = "playerO")]
        player_o: MemberId,
        moves: Vec<PlayedMove>,
    },

    /// Any tag this version does not understand
    #[serde(other)]
    Unknown,
}

/// One accepted move inside a [`GameMessage::GameSync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayedMove {
    pub mark: Mark,
    pub cell: u8,
}

/// Errors raised while encoding or decoding a [`GameMessage`]
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cell index {0} is outside the board")]
    CellOutOfRange(u8),
}

impl GameMessage {
    /// Wire tag of this message (for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            GameMessage::MoveMade { .. } => "MoveMade",
            GameMessage::GameStarted { .. } => "GameStarted",
            GameMessage::GameReset => "GameReset",
            GameMessage::Chat { .. } => "Chat",
            GameMessage::GameSync { .. } => "GameSync",
            GameMessage::Unknown => "Unknown",
        }
    }

    /// JSON schema of the wire vocabulary
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(GameMessage)
    }
}

/// Serialize a message into a channel payload
pub fn encode(message: &GameMessage) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(message)?)
}

/// Parse a channel payload
///
/// Unknown tags are not an error; they come back as [`GameMessage::Unknown`].
pub fn decode(payload: &[u8]) -> Result<GameMessage, CodecError> {
    let message: GameMessage = serde_json::from_slice(payload)?;

    match &message {
        GameMessage::MoveMade { cell, .. } => check_cell(*cell)?,
        GameMessage::GameSync { moves, .. } => {
            for mv in moves {
                check_cell(mv.cell)?;
            }
        }
        _ => {}
    }

    Ok(message)
}

fn check_cell(cell: u8) -> Result<(), CodecError> {
    if usize::from(cell) >= CELL_COUNT {
        return Err(CodecError::CellOutOfRange(cell));
    }
    Ok(())
}

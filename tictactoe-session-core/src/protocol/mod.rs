//! Wire vocabulary exchanged between replicas over the broadcast channel.
//!
//! Only typed messages drive state transitions. Chat text is carried for
//! display and never interpreted.

mod mark;
mod message;

pub use mark::Mark;
pub use message::{decode, encode, CodecError, GameMessage, PlayedMove};

/// Number of cells on the board; valid cell indices are `0..CELL_COUNT`
pub const CELL_COUNT: usize = 9;

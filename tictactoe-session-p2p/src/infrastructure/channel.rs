use crate::application::ChannelEvent;
use crate::infrastructure::error::Result;
use tictactoe_session_core::MemberId;

/// Broadcast channel a game session runs over (allows mocking in tests)
///
/// Payloads from one sender must arrive in the order they were sent. A
/// channel may or may not echo a member's own broadcasts back to it.
pub trait Channel {
    /// Our identity, once the channel has registered us
    fn local_id(&self) -> Option<MemberId>;

    /// Members present right now, in the order the channel reports them
    fn current_members(&self) -> Vec<MemberId>;

    fn broadcast(&mut self, data: Vec<u8>) -> Result<()>;

    /// Drain membership changes and payloads received since the last call
    fn poll_events(&mut self) -> Vec<ChannelEvent>;

    /// Leave the channel; other members observe a leave
    fn close(&mut self) {}
}

use tictactoe_session_core::MemberId;

/// Events emitted by a broadcast channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A member joined the channel
    MemberJoined(MemberId),
    /// A member left the channel
    MemberLeft(MemberId),
    /// Received a payload from a member
    MessageReceived { from: MemberId, data: Vec<u8> },
}

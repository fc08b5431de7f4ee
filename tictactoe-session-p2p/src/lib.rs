// Domain layer (connection settings)
pub mod domain;

// Application layer (session runtime)
pub mod application;

// Infrastructure layer (channel adapters)
pub mod infrastructure;

// Re-exports for convenience
pub use application::{ChannelEvent, GameSession, SessionConfig};
pub use domain::IceServer;
pub use infrastructure::channel::Channel;
pub use infrastructure::error::{P2PError, Result};

#[cfg(feature = "native")]
pub use infrastructure::matchbox::MatchboxChannel;

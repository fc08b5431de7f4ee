mod config;
mod events;
mod session;

pub use config::SessionConfig;
pub use events::ChannelEvent;
pub use session::GameSession;

use crate::domain::IceServer;
use std::time::Duration;

/// Configuration for a networked game session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Matchbox signalling server URL
    pub signalling_server: String,

    /// Room both players join; appended to the server URL
    pub room: String,

    /// ICE servers for NAT traversal
    pub ice_servers: Vec<IceServer>,

    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,

    /// How long to wait for the signalling server to assign us an identity
    pub connect_timeout: Duration,

    /// How long to let peers already in the room connect before the member
    /// snapshot is taken
    pub peer_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signalling_server: "ws://localhost:3536".to_string(),
            room: "tictactoe".to_string(),
            ice_servers: IceServer::default_stun_servers(),
            poll_interval_ms: 50,
            connect_timeout: Duration::from_secs(5),
            peer_settle: Duration::from_millis(1500),
        }
    }
}

impl SessionConfig {
    pub fn new(signalling_server: String) -> Self {
        Self {
            signalling_server,
            ..Default::default()
        }
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServer>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    /// Append a server (e.g. TURN) to the configured list
    pub fn with_ice_server(mut self, server: IceServer) -> Self {
        self.ice_servers.push(server);
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_peer_settle(mut self, settle: Duration) -> Self {
        self.peer_settle = settle;
        self
    }

    /// Full signalling URL for the configured room
    pub fn room_url(&self) -> String {
        format!(
            "{}/{}",
            self.signalling_server.trim_end_matches('/'),
            self.room
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

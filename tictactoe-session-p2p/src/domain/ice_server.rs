use serde::{Deserialize, Serialize};

/// ICE server used for WebRTC NAT traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
    /// Server URLs (several for failover)
    pub urls: Vec<String>,
    /// Required for TURN
    pub username: Option<String>,
    /// Required for TURN
    pub credential: Option<String>,
}

impl IceServer {
    pub fn stun(url: String) -> Self {
        Self {
            urls: vec![url],
            username: None,
            credential: None,
        }
    }

    /// TURN relay with credentials
    pub fn turn(url: String, username: String, credential: String) -> Self {
        Self::stun(url).with_auth(username, credential)
    }

    pub fn with_auth(mut self, username: String, credential: String) -> Self {
        self.username = Some(username);
        self.credential = Some(credential);
        self
    }

    pub fn has_auth(&self) -> bool {
        self.username.is_some() && self.credential.is_some()
    }

    /// Public Google STUN servers
    pub fn default_stun_servers() -> Vec<Self> {
        vec![
            Self::stun("stun:stun.l.google.com:19302".to_string()),
            Self::stun("stun:stun1.l.google.com:19302".to_string()),
        ]
    }
}

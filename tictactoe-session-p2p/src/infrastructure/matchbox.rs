use crate::application::{ChannelEvent, SessionConfig};
use crate::domain::IceServer;
use crate::infrastructure::channel::Channel;
use crate::infrastructure::error::{P2PError, Result};
use matchbox_socket::{PeerState, RtcIceServerConfig, WebRtcSocket, WebRtcSocketBuilder};
use std::time::Duration;
use tictactoe_session_core::MemberId;
use tracing::Instrument;

/// WebRTC broadcast channel via Matchbox signalling
///
/// Matchbox never echoes our own broadcasts, so the session's self-echo
/// guard simply never fires here.
pub struct MatchboxChannel {
    /// Dropped on close, which disconnects us from every peer
    socket: Option<WebRtcSocket>,
    local_id: MemberId,
    /// Peer changes observed while connecting, handed out on the first poll
    pending: Vec<ChannelEvent>,
}

impl MatchboxChannel {
    /// Join the configured room
    ///
    /// Resolves once the server assigned us an identity and the peers already
    /// in the room had `peer_settle` to connect, so `current_members` lists
    /// them and a late joiner finds the incumbents paired.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        let room_url = config.room_url();
        tracing::info!("Connecting to signalling server: {}", room_url);
        for (i, server) in config.ice_servers.iter().enumerate() {
            tracing::debug!(
                "  ICE Server {}: {}{}",
                i + 1,
                server.urls.join(", "),
                if server.has_auth() { " (with auth)" } else { "" }
            );
        }

        let (mut socket, loop_fut) = WebRtcSocketBuilder::new(room_url)
            .ice_server(build_ice_server_config(&config.ice_servers))
            .add_channel(matchbox_socket::ChannelConfig::reliable())
            .build();

        tokio::spawn(
            async move {
                if let Err(e) = loop_fut.await {
                    tracing::error!("Signalling loop ended: {:?}", e);
                }
            }
            .instrument(tracing::info_span!("matchbox::webrtc_loop")),
        );

        let mut pending = Vec::new();
        let local_id = wait_for_local_id(&mut socket, &mut pending, config.connect_timeout).await?;
        tracing::info!("Connected as {}", local_id);
        settle_peers(&mut socket, &mut pending, config.peer_settle).await;

        Ok(Self {
            socket: Some(socket),
            local_id,
            pending,
        })
    }
}

impl Channel for MatchboxChannel {
    fn local_id(&self) -> Option<MemberId> {
        Some(self.local_id.clone())
    }

    fn current_members(&self) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = self
            .socket
            .iter()
            .flat_map(|socket| socket.connected_peers())
            .map(|peer| MemberId::new(peer.to_string()))
            .collect();
        members.push(self.local_id.clone());
        members
    }

    fn broadcast(&mut self, data: Vec<u8>) -> Result<()> {
        let socket = self.socket.as_mut().ok_or(P2PError::ChannelClosed)?;

        let peers: Vec<_> = socket.connected_peers().collect();
        let channel = socket.channel_mut(0);
        for peer in &peers {
            channel.send(data.clone().into_boxed_slice(), *peer);
        }

        tracing::debug!("Broadcast {} bytes to {} peers", data.len(), peers.len());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<ChannelEvent> {
        let mut events = std::mem::take(&mut self.pending);
        let Some(socket) = self.socket.as_mut() else {
            return events;
        };

        for (peer, state) in socket.update_peers() {
            events.push(peer_event(peer, state));
        }

        for (peer, packet) in socket.channel_mut(0).receive() {
            tracing::trace!("Received {} bytes from {}", packet.len(), peer);
            events.push(ChannelEvent::MessageReceived {
                from: MemberId::new(peer.to_string()),
                data: packet.to_vec(),
            });
        }

        events
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            tracing::info!("Left room as {}", self.local_id);
        }
    }
}

fn peer_event(peer: matchbox_socket::PeerId, state: PeerState) -> ChannelEvent {
    let member = MemberId::new(peer.to_string());
    match state {
        PeerState::Connected => {
            tracing::info!("Peer connected: {}", member);
            ChannelEvent::MemberJoined(member)
        }
        PeerState::Disconnected => {
            tracing::info!("Peer disconnected: {}", member);
            ChannelEvent::MemberLeft(member)
        }
    }
}

/// Merge configured servers into the single config Matchbox accepts
///
/// All URLs are kept; credentials come from the first server that has any.
fn build_ice_server_config(ice_servers: &[IceServer]) -> RtcIceServerConfig {
    if ice_servers.is_empty() {
        return RtcIceServerConfig::default();
    }

    let auth = ice_servers.iter().find(|s| s.has_auth());
    RtcIceServerConfig {
        urls: ice_servers.iter().flat_map(|s| s.urls.clone()).collect(),
        username: auth.and_then(|s| s.username.clone()),
        credential: auth.and_then(|s| s.credential.clone()),
    }
}

async fn wait_for_local_id(
    socket: &mut WebRtcSocket,
    pending: &mut Vec<ChannelEvent>,
    timeout: Duration,
) -> Result<MemberId> {
    let start = tokio::time::Instant::now();

    loop {
        for (peer, state) in socket.update_peers() {
            pending.push(peer_event(peer, state));
        }

        if let Some(id) = socket.id() {
            return Ok(MemberId::new(id.to_string()));
        }

        if start.elapsed() > timeout {
            return Err(P2PError::ConnectionFailed(format!(
                "No identity assigned within {:?}",
                timeout
            )));
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Collect peer connections for `window`
///
/// The server assigns our identity before any data channel is up, so right
/// after that the connected set is always empty.
async fn settle_peers(socket: &mut WebRtcSocket, pending: &mut Vec<ChannelEvent>, window: Duration) {
    let deadline = tokio::time::Instant::now() + window;

    while tokio::time::Instant::now() < deadline {
        for (peer, state) in socket.update_peers() {
            pending.push(peer_event(peer, state));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    tracing::debug!(
        "{} peer(s) connected after {:?}",
        socket.connected_peers().count(),
        window
    );
}

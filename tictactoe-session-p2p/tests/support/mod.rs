#![allow(dead_code)]

pub mod mock_channel;

use mock_channel::{create_mock_network, MockChannel, SharedNetwork};
use tictactoe_session_core::{Board, GameStatus, Mark, MemberId};
use tictactoe_session_p2p::{Channel, ChannelEvent, GameSession, P2PError, Result};

impl Channel for MockChannel {
    fn local_id(&self) -> Option<MemberId> {
        Some(MockChannel::local_id(self))
    }

    fn current_members(&self) -> Vec<MemberId> {
        MockChannel::current_members(self)
    }

    fn broadcast(&mut self, data: Vec<u8>) -> Result<()> {
        MockChannel::broadcast(self, data).map_err(P2PError::SendFailed)
    }

    fn poll_events(&mut self) -> Vec<ChannelEvent> {
        MockChannel::poll_events(self)
    }

    fn close(&mut self) {
        MockChannel::close(self)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Test fixture: several replicas sharing one mock network
pub struct MatchFixture {
    pub network: SharedNetwork,
    pub replicas: Vec<GameSession<MockChannel>>,
}

impl MatchFixture {
    /// Replicas join in the given order
    pub fn new(names: &[&str]) -> Self {
        Self::with_echo(names, false)
    }

    /// Same, on a channel that echoes broadcasts back to the sender
    pub fn with_echo(names: &[&str], echo_to_self: bool) -> Self {
        init_tracing();
        let network = create_mock_network();
        network.lock().unwrap().echo_to_self = echo_to_self;

        let mut fixture = Self {
            network,
            replicas: Vec::new(),
        };
        for name in names {
            fixture.join(name);
        }
        fixture.tick(2);
        fixture
    }

    pub fn join(&mut self, name: &str) {
        let channel = MockChannel::join(&self.network, name);
        let session = GameSession::new(channel).unwrap();
        self.replicas.push(session);
    }

    /// Disconnect a replica
    pub fn leave(&mut self, name: &str) {
        let index = self.index_of(name);
        let session = self.replicas.remove(index);
        session.leave();
    }

    pub fn replica(&mut self, name: &str) -> &mut GameSession<MockChannel> {
        let index = self.index_of(name);
        &mut self.replicas[index]
    }

    fn index_of(&self, name: &str) -> usize {
        self.replicas
            .iter()
            .position(|r| r.local_id().as_str() == name)
            .unwrap_or_else(|| panic!("No replica named {}", name))
    }

    /// Poll all replicas `count` times
    pub fn tick(&mut self, count: usize) {
        for _ in 0..count {
            for replica in self.replicas.iter_mut() {
                replica.poll();
            }
        }
    }

    /// Play a move and let it propagate
    pub fn play(&mut self, name: &str, cell: u8) {
        self.replica(name)
            .play(cell)
            .unwrap_or_else(|e| panic!("{} could not play {}: {}", name, cell, e));
        self.tick(2);
    }

    pub fn mark_of(&mut self, name: &str) -> Option<Mark> {
        self.replica(name).session().local_mark()
    }

    /// Every replica sees the same board, turn and status
    pub fn assert_converged(&self) -> (Board, Mark, GameStatus) {
        let first = &self.replicas[0];
        let expected = (
            *first.game().board(),
            first.game().current_mark(),
            first.game().status(),
        );

        for replica in &self.replicas[1..] {
            let actual = (
                *replica.game().board(),
                replica.game().current_mark(),
                replica.game().status(),
            );
            assert_eq!(
                actual,
                expected,
                "{} diverged from {}",
                replica.local_id(),
                first.local_id()
            );
        }

        expected
    }
}

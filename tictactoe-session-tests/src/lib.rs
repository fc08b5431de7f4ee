use cucumber::World;
use std::collections::BTreeMap;
use tictactoe_session_core::{
    Dispatcher, GameStateMachine, Inbound, Mark, MemberId, Move, MoveOutcome, Routed,
    SessionError,
};

/// Several replicas wired together by an in-memory broadcast
///
/// Broadcasts are delivered synchronously, in join order, unless the world
/// is partitioned; then they are parked until `heal` is called.
#[derive(Debug, World, Default)]
pub struct GameWorld {
    /// Replicas in join order
    pub replicas: Vec<Dispatcher>,

    /// Standalone state machines for replay scenarios
    pub machines: BTreeMap<String, GameStateMachine>,

    /// Broadcasts waiting for `heal`
    pub parked: Vec<(MemberId, Vec<u8>)>,

    pub partitioned: bool,

    /// Last local action error (for assertions)
    pub last_error: Option<SessionError>,

    /// Last routing result per receiving replica
    pub last_routed: BTreeMap<String, String>,
}

impl GameWorld {
    /// Add a replica seeded with the current members; the others see it join
    pub fn join(&mut self, name: &str) {
        let member = MemberId::from(name);
        let existing: Vec<MemberId> = self.replicas.iter().map(|r| r.local().clone()).collect();

        self.replicas
            .push(Dispatcher::with_members(member.clone(), existing));
        self.announce_newcomer(&member);
    }

    /// Add a replica that learns about the others one join at a time
    pub fn join_unseeded(&mut self, name: &str) {
        let member = MemberId::from(name);
        let existing: Vec<MemberId> = self.replicas.iter().map(|r| r.local().clone()).collect();

        self.replicas.push(Dispatcher::new(member.clone()));
        let index = self.replicas.len() - 1;
        for other in existing {
            self.replicas[index].dispatch(Inbound::MemberJoined(other.clone()));
            self.send_catch_up(index, &other);
        }
        self.announce_newcomer(&member);
    }

    /// Every other replica sees `member` join; players answer with their view
    fn announce_newcomer(&mut self, member: &MemberId) {
        for index in 0..self.replicas.len() {
            if self.replicas[index].local() == member {
                continue;
            }
            self.replicas[index].dispatch(Inbound::MemberJoined(member.clone()));
            self.send_catch_up(index, member);
        }
    }

    fn send_catch_up(&mut self, index: usize, newcomer: &MemberId) {
        let replica = &self.replicas[index];
        if !replica.session().is_spectator(newcomer) {
            return;
        }

        match replica.catch_up() {
            Ok(Some(payload)) => {
                let from = replica.local().clone();
                self.broadcast(from, payload);
            }
            Ok(None) => {}
            Err(e) => self.last_error = Some(e),
        }
    }

    pub fn leave(&mut self, name: &str) {
        let index = self.index_of(name);
        let gone = self.replicas.remove(index);

        for replica in self.replicas.iter_mut() {
            replica.dispatch(Inbound::MemberLeft(gone.local().clone()));
        }
    }

    pub fn replica(&self, name: &str) -> &Dispatcher {
        &self.replicas[self.index_of(name)]
    }

    fn index_of(&self, name: &str) -> usize {
        self.replicas
            .iter()
            .position(|r| r.local().as_str() == name)
            .unwrap_or_else(|| panic!("No replica named '{}'", name))
    }

    /// Local move: validate, broadcast, then apply
    pub fn play(&mut self, name: &str, cell: u8) -> Option<MoveOutcome> {
        let index = self.index_of(name);
        let prepared = self.replicas[index].prepare_move(cell);

        match prepared {
            Ok((mv, payload)) => {
                self.broadcast(MemberId::from(name), payload);
                self.commit(index, &mv)
            }
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }

    fn commit(&mut self, index: usize, mv: &Move) -> Option<MoveOutcome> {
        match self.replicas[index].commit_move(mv) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }

    pub fn request_rematch(&mut self, name: &str) {
        let index = self.index_of(name);
        match self.replicas[index].prepare_rematch() {
            Ok(payload) => {
                self.broadcast(MemberId::from(name), payload);
                if let Err(e) = self.replicas[index].commit_rematch() {
                    self.last_error = Some(e);
                }
            }
            Err(e) => self.last_error = Some(e),
        }
    }

    /// Deliver to every replica except the sender (or park while partitioned)
    pub fn broadcast(&mut self, from: MemberId, payload: Vec<u8>) {
        if self.partitioned {
            self.parked.push((from, payload));
            return;
        }

        for index in 0..self.replicas.len() {
            if self.replicas[index].local() != &from {
                self.deliver(index, from.clone(), payload.clone());
            }
        }
    }

    /// Deliver a raw payload to one replica as if `from` sent it
    pub fn deliver_raw(&mut self, to: &str, from: &str, payload: &[u8]) {
        let index = self.index_of(to);
        self.deliver(index, MemberId::from(from), payload.to_vec());
    }

    fn deliver(&mut self, index: usize, from: MemberId, payload: Vec<u8>) {
        let routed = self.replicas[index].dispatch(Inbound::Message { from, payload });
        let label = match routed {
            Routed::Applied => "applied".to_string(),
            Routed::Stale => "stale".to_string(),
            Routed::SelfEcho => "self-echo".to_string(),
            Routed::Unknown => "unknown".to_string(),
            Routed::Dropped(e) => format!("dropped: {}", e),
        };
        let name = self.replicas[index].local().to_string();
        self.last_routed.insert(name, label);
    }

    pub fn partition(&mut self) {
        self.partitioned = true;
    }

    /// Deliver every parked broadcast in the order it was sent
    pub fn heal(&mut self) {
        self.partitioned = false;
        for (from, payload) in std::mem::take(&mut self.parked) {
            self.broadcast(from, payload);
        }
    }

    pub fn mark_of(&self, name: &str) -> Option<Mark> {
        self.replica(name).session().local_mark()
    }

    pub fn last_routed(&self, name: &str) -> &str {
        self.last_routed
            .get(name)
            .map(String::as_str)
            .unwrap_or("nothing")
    }
}

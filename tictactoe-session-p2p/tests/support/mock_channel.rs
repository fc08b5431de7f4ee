use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tictactoe_session_core::MemberId;
use tictactoe_session_p2p::ChannelEvent;

/// In-memory broadcast channel shared by every replica of a test
///
/// Delivery is per-sender FIFO. While `hold` is set, broadcasts are parked
/// and only reach inboxes on `release`, which lets two replicas act before
/// seeing each other.
#[derive(Default)]
pub struct MockNetwork {
    /// Members in join order
    pub members: Vec<MemberId>,

    pub inboxes: HashMap<MemberId, VecDeque<ChannelEvent>>,

    /// Deliver a sender's broadcasts back to itself
    pub echo_to_self: bool,

    /// Park broadcasts instead of delivering them
    pub hold: bool,

    /// Make every broadcast fail
    pub fail_sends: bool,

    /// Newcomers get an empty member snapshot and learn about the others
    /// through `MemberJoined` events, as with WebRTC peers still connecting
    pub members_arrive_late: bool,

    parked: VecDeque<(MemberId, Vec<u8>)>,
}

impl MockNetwork {
    fn deliver(&mut self, from: &MemberId, data: &[u8]) {
        for member in &self.members {
            if member == from && !self.echo_to_self {
                continue;
            }
            if let Some(inbox) = self.inboxes.get_mut(member) {
                inbox.push_back(ChannelEvent::MessageReceived {
                    from: from.clone(),
                    data: data.to_vec(),
                });
            }
        }
    }

    /// Deliver everything parked while `hold` was set
    pub fn release(&mut self) {
        self.hold = false;
        while let Some((from, data)) = self.parked.pop_front() {
            self.deliver(&from, &data);
        }
    }

    /// Push a raw payload to one member as if `from` had sent it
    pub fn inject(&mut self, to: &MemberId, from: &str, data: &[u8]) {
        if let Some(inbox) = self.inboxes.get_mut(to) {
            inbox.push_back(ChannelEvent::MessageReceived {
                from: MemberId::from(from),
                data: data.to_vec(),
            });
        }
    }
}

pub type SharedNetwork = Arc<Mutex<MockNetwork>>;

pub fn create_mock_network() -> SharedNetwork {
    Arc::new(Mutex::new(MockNetwork::default()))
}

/// One member's handle on the [`MockNetwork`]
pub struct MockChannel {
    local_id: MemberId,
    network: SharedNetwork,
    snapshot_hidden: bool,
}

impl MockChannel {
    /// Register `name` and notify the members already present
    pub fn join(network: &SharedNetwork, name: &str) -> Self {
        let local_id = MemberId::from(name);
        let mut net = network.lock().unwrap();

        for inbox in net.inboxes.values_mut() {
            inbox.push_back(ChannelEvent::MemberJoined(local_id.clone()));
        }

        let mut inbox = VecDeque::new();
        if net.members_arrive_late {
            inbox.extend(net.members.iter().cloned().map(ChannelEvent::MemberJoined));
        }
        let snapshot_hidden = net.members_arrive_late;
        net.members.push(local_id.clone());
        net.inboxes.insert(local_id.clone(), inbox);
        drop(net);

        Self {
            local_id,
            network: network.clone(),
            snapshot_hidden,
        }
    }

    pub fn local_id(&self) -> MemberId {
        self.local_id.clone()
    }

    pub fn current_members(&self) -> Vec<MemberId> {
        if self.snapshot_hidden {
            return vec![self.local_id.clone()];
        }
        self.network.lock().unwrap().members.clone()
    }

    pub fn broadcast(&mut self, data: Vec<u8>) -> Result<(), String> {
        let mut net = self.network.lock().unwrap();
        if net.fail_sends {
            return Err(format!("{} could not reach the network", self.local_id));
        }
        if !net.members.contains(&self.local_id) {
            return Err(format!("{} is no longer connected", self.local_id));
        }

        if net.hold {
            net.parked.push_back((self.local_id.clone(), data));
        } else {
            net.deliver(&self.local_id, &data);
        }
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<ChannelEvent> {
        let mut net = self.network.lock().unwrap();
        net.inboxes
            .get_mut(&self.local_id)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Disconnect and notify the remaining members
    pub fn close(&mut self) {
        let mut net = self.network.lock().unwrap();
        net.members.retain(|m| m != &self.local_id);
        net.inboxes.remove(&self.local_id);
        for inbox in net.inboxes.values_mut() {
            inbox.push_back(ChannelEvent::MemberLeft(self.local_id.clone()));
        }
    }
}

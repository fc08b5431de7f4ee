use crate::application::ChannelEvent;
use crate::infrastructure::channel::Channel;
use crate::infrastructure::error::{P2PError, Result};
use tictactoe_session_core::{
    Dispatcher, GameStateMachine, Inbound, MemberId, MoveOutcome, Routed, SessionEvent,
    SessionManager,
};

type Observer = Box<dyn FnMut(&SessionEvent)>;

/// Application service: one replica of a game running over a [`Channel`]
///
/// Everything runs on the caller's loop. Call [`GameSession::poll`]
/// regularly; local actions broadcast first and only then change state.
pub struct GameSession<C: Channel> {
    channel: C,
    dispatcher: Dispatcher,

    /// Events not yet drained by the caller
    events: Vec<SessionEvent>,

    observer: Option<Observer>,
}

impl<C: Channel> GameSession<C> {
    /// Start a replica on an already registered channel
    pub fn new(channel: C) -> Result<Self> {
        let local = channel.local_id().ok_or_else(|| {
            P2PError::ConnectionFailed("Channel has not assigned us an identity".to_string())
        })?;

        let existing: Vec<MemberId> = channel
            .current_members()
            .into_iter()
            .filter(|member| member != &local)
            .collect();
        tracing::info!(
            "Starting session as {} with {} member(s) present",
            local,
            existing.len()
        );

        let mut session = Self {
            channel,
            dispatcher: Dispatcher::with_members(local, existing),
            events: Vec::new(),
            observer: None,
        };
        session.flush();

        Ok(session)
    }

    // ===== Queries =====

    pub fn local_id(&self) -> &MemberId {
        self.dispatcher.local()
    }

    pub fn session(&self) -> &SessionManager {
        self.dispatcher.session()
    }

    pub fn game(&self) -> &GameStateMachine {
        self.dispatcher.session().game()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    // ===== Loop =====

    /// Process everything the channel delivered since the last call
    ///
    /// Returns how many inbound items changed the session.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;

        for event in self.channel.poll_events() {
            let inbound = match event {
                ChannelEvent::MemberJoined(member) => Inbound::MemberJoined(member),
                ChannelEvent::MemberLeft(member) => Inbound::MemberLeft(member),
                ChannelEvent::MessageReceived { from, data } => Inbound::Message {
                    from,
                    payload: data,
                },
            };

            if let Routed::Applied = self.dispatcher.dispatch(inbound) {
                applied += 1;
            }
        }

        self.flush();
        applied
    }

    /// Register a callback invoked for every event as it is emitted
    pub fn set_observer(&mut self, observer: impl FnMut(&SessionEvent) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Drain all emitted events (caller's responsibility)
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ===== Local actions =====

    /// Place our mark on `cell`
    ///
    /// The move is broadcast before it is applied; if the broadcast fails
    /// nothing changes locally.
    pub fn play(&mut self, cell: u8) -> Result<MoveOutcome> {
        let (mv, payload) = self.dispatcher.prepare_move(cell)?;
        self.channel.broadcast(payload)?;

        let outcome = self.dispatcher.commit_move(&mv)?;
        self.flush();
        Ok(outcome)
    }

    /// Ask for a new game after the current one ended
    pub fn request_rematch(&mut self) -> Result<()> {
        let payload = self.dispatcher.prepare_rematch()?;
        self.channel.broadcast(payload)?;

        self.dispatcher.commit_rematch()?;
        self.flush();
        Ok(())
    }

    /// Send informational text to everyone
    pub fn say(&mut self, text: impl Into<String>) -> Result<()> {
        let payload = self.dispatcher.chat(text)?;
        self.channel.broadcast(payload)
    }

    /// Leave the channel; the others reset their game if we held a role
    pub fn leave(mut self) {
        tracing::info!("{} leaving session", self.local_id());
        self.channel.close();
    }

    // ===== Internals =====

    /// Hand new events to the observer and queue them for draining
    fn flush(&mut self) {
        let events = self.dispatcher.drain_events();
        if events.is_empty() {
            return;
        }

        if events
            .iter()
            .any(|e| matches!(e, SessionEvent::GameStarted { .. }))
        {
            self.announce_start();
        }

        let local = self.local_id().clone();
        if events
            .iter()
            .any(|e| matches!(e, SessionEvent::SpectatorJoined { member } if member != &local))
        {
            self.send_catch_up();
        }

        if let Some(observer) = self.observer.as_mut() {
            for event in &events {
                observer(event);
            }
        }
        self.events.extend(events);
    }

    /// Tell a newcomer who holds the seats and what has been played
    fn send_catch_up(&mut self) {
        let payload = match self.dispatcher.catch_up() {
            Ok(Some(payload)) => payload,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Failed to encode game sync: {}", e);
                return;
            }
        };

        if let Err(e) = self.channel.broadcast(payload) {
            tracing::warn!("Failed to send game sync: {}", e);
        }
    }

    fn announce_start(&mut self) {
        let payload = match self.dispatcher.announce_start() {
            Ok(Some(payload)) => payload,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Failed to encode start announcement: {}", e);
                return;
            }
        };

        if let Err(e) = self.channel.broadcast(payload) {
            tracing::warn!("Failed to announce game start: {}", e);
        }
    }
}

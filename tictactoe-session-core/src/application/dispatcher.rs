use crate::domain::{GameStatus, MemberId, Move, MoveOutcome, SessionError, SessionEvent, SessionManager};
use crate::protocol::{decode, encode, GameMessage, Mark, PlayedMove};

/// Traffic observed on the broadcast channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    MemberJoined(MemberId),
    MemberLeft(MemberId),
    Message { from: MemberId, payload: Vec<u8> },
}

/// What the dispatcher did with one [`Inbound`]
#[derive(Debug)]
pub enum Routed {
    /// Reached the session and changed (or confirmed) its state
    Applied,

    /// Valid but had no effect (duplicate join, stale rematch, ...)
    Stale,

    /// Our own broadcast came back; already applied locally
    SelfEcho,

    /// Message type this version does not know
    Unknown,

    /// Rejected; the replica's state is untouched
    Dropped(SessionError),
}

impl Routed {
    pub fn is_applied(&self) -> bool {
        matches!(self, Routed::Applied)
    }
}

/// Routes channel traffic into a [`SessionManager`]
///
/// Local actions are split into `prepare_*` (validate and encode) and
/// `commit_*` (apply) so the caller can broadcast in between. A move whose
/// broadcast fails is therefore never applied, and replicas cannot diverge
/// because of it.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    session: SessionManager,
}

impl Dispatcher {
    pub fn new(local: MemberId) -> Self {
        Self {
            session: SessionManager::new(local),
        }
    }

    /// Dispatcher for a channel that already has members
    pub fn with_members(local: MemberId, existing: impl IntoIterator<Item = MemberId>) -> Self {
        Self {
            session: SessionManager::with_members(local, existing),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn local(&self) -> &MemberId {
        self.session.local()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.session.drain_events()
    }

    // ===== Inbound =====

    /// Route one piece of channel traffic
    pub fn dispatch(&mut self, inbound: Inbound) -> Routed {
        match inbound {
            Inbound::MemberJoined(member) => {
                if self.session.on_member_join(member) {
                    Routed::Applied
                } else {
                    Routed::Stale
                }
            }

            Inbound::MemberLeft(member) => {
                if &member == self.session.local() {
                    tracing::debug!("Ignoring leave notification for ourselves");
                    return Routed::Stale;
                }
                if self.session.on_member_leave(&member) {
                    Routed::Applied
                } else {
                    Routed::Stale
                }
            }

            Inbound::Message { from, payload } => self.dispatch_message(from, &payload),
        }
    }

    fn dispatch_message(&mut self, from: MemberId, payload: &[u8]) -> Routed {
        if &from == self.session.local() {
            tracing::trace!("Skipping self-echo");
            return Routed::SelfEcho;
        }

        let message = match decode(payload) {
            Ok(message) => message,
            Err(e) => return Self::dropped(&from, "payload", e.into()),
        };
        let kind = message.kind();
        tracing::debug!("Received {} from {}", kind, from);

        let result = match message {
            GameMessage::MoveMade { mark, cell } => self
                .session
                .apply_move(&Move {
                    mark,
                    cell,
                    player: from.clone(),
                })
                .map(|_| Routed::Applied),

            GameMessage::GameStarted { first_mark } => self
                .session
                .on_game_started(&from, first_mark)
                .map(|_| Routed::Applied),

            GameMessage::GameReset => self.session.on_game_reset(&from).map(|restarted| {
                if restarted {
                    Routed::Applied
                } else {
                    Routed::Stale
                }
            }),

            GameMessage::GameSync {
                player_x,
                player_o,
                moves,
            } => self
                .session
                .on_game_sync(&from, player_x, player_o, &moves)
                .map(|changed| if changed { Routed::Applied } else { Routed::Stale }),

            GameMessage::Chat { text } => {
                self.session.on_chat(&from, text);
                Ok(Routed::Applied)
            }

            GameMessage::Unknown => {
                tracing::debug!("Ignoring unknown message type from {}", from);
                Ok(Routed::Unknown)
            }
        };

        result.unwrap_or_else(|e| Self::dropped(&from, kind, e))
    }

    fn dropped(from: &MemberId, kind: &str, error: SessionError) -> Routed {
        tracing::warn!("Dropped {} from {}: {}", kind, from, error);
        Routed::Dropped(error)
    }

    // ===== Local actions =====

    /// Validate a local move and encode it for broadcast
    pub fn prepare_move(&self, cell: u8) -> Result<(Move, Vec<u8>), SessionError> {
        let mv = self.session.prepare_local_move(cell)?;
        let payload = encode(&GameMessage::MoveMade {
            mark: mv.mark,
            cell: mv.cell,
        })?;
        Ok((mv, payload))
    }

    /// Apply a previously prepared move once it has been broadcast
    pub fn commit_move(&mut self, mv: &Move) -> Result<MoveOutcome, SessionError> {
        self.session.apply_move(mv)
    }

    /// Check that we may ask for a new game and encode the request
    pub fn prepare_rematch(&self) -> Result<Vec<u8>, SessionError> {
        self.session.prepare_rematch()?;
        Ok(encode(&GameMessage::GameReset)?)
    }

    /// Restart locally after the rematch request has been broadcast
    pub fn commit_rematch(&mut self) -> Result<bool, SessionError> {
        let local = self.session.local().clone();
        self.session.on_game_reset(&local)
    }

    /// Encode chat text; nothing changes locally
    pub fn chat(&self, text: impl Into<String>) -> Result<Vec<u8>, SessionError> {
        Ok(encode(&GameMessage::Chat { text: text.into() })?)
    }

    /// Encode our view of the game for a member that just joined
    ///
    /// Only a replica holding a seat in a bound game speaks for it.
    pub fn catch_up(&self) -> Result<Option<Vec<u8>>, SessionError> {
        let session = &self.session;
        let roles = session.roles();
        let (Some(player_x), Some(player_o)) = (roles.holder(Mark::X), roles.holder(Mark::O))
        else {
            return Ok(None);
        };
        if session.local_mark().is_none() {
            return Ok(None);
        }

        let moves = session
            .game()
            .history()
            .iter()
            .map(|mv| PlayedMove {
                mark: mv.mark,
                cell: mv.cell,
            })
            .collect();
        let payload = encode(&GameMessage::GameSync {
            player_x: player_x.clone(),
            player_o: player_o.clone(),
            moves,
        })?;
        Ok(Some(payload))
    }

    /// Encode a start announcement if we hold a role in a running game
    pub fn announce_start(&self) -> Result<Option<Vec<u8>>, SessionError> {
        let session = &self.session;
        let fresh = session.game().status() == GameStatus::InProgress
            && session.game().history().is_empty();
        if session.local_mark().is_none() || !fresh {
            return Ok(None);
        }

        let payload = encode(&GameMessage::GameStarted {
            first_mark: session.game().first_mark(),
        })?;
        Ok(Some(payload))
    }
}

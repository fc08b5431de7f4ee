use crate::domain::{
    GameOutcome, GameStateMachine, GameStatus, MemberId, Move, MoveError, MoveOutcome,
    PlayerRoles, SessionEvent,
};
use crate::protocol::{CodecError, Mark, PlayedMove};

/// Errors surfaced by session operations
///
/// None of these are fatal to a replica: inbound offenders are dropped and
/// locally requested actions are handed back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] CodecError),

    #[error("Member {0} holds no role in the current game")]
    RoleConflict(MemberId),

    #[error("A new game can only be requested after the current one ends (status: {0})")]
    RematchNotAllowed(GameStatus),
}

/// Membership, role binding and start/stop arbitration for one replica
///
/// Roles are derived from the roster alone: once two members are present
/// they are sorted by identity and bound X/O. No negotiation message is
/// exchanged, so every replica computes the same binding from the same
/// membership.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Our own identity on the channel
    local: MemberId,

    /// Joined identities in locally observed arrival order
    roster: Vec<MemberId>,

    roles: PlayerRoles,

    game: GameStateMachine,

    /// Observation events (caller drains these)
    outbound: Vec<SessionEvent>,
}

impl SessionManager {
    /// Session where we are the only member so far
    pub fn new(local: MemberId) -> Self {
        Self::with_members(local, std::iter::empty())
    }

    /// Session seeded from the channel's current membership
    ///
    /// Existing members are added first, in the given order, then the local
    /// identity, so a late joiner finds the incumbents already paired.
    pub fn with_members(local: MemberId, existing: impl IntoIterator<Item = MemberId>) -> Self {
        let mut session = Self {
            local: local.clone(),
            roster: Vec::new(),
            roles: PlayerRoles::new(),
            game: GameStateMachine::new(),
            outbound: Vec::new(),
        };

        for member in existing {
            session.on_member_join(member);
        }
        session.on_member_join(local);

        if !session.roles.is_complete() {
            session.outbound.push(SessionEvent::WaitingForOpponent);
        }

        session
    }

    // ===== Queries =====

    pub fn local(&self) -> &MemberId {
        &self.local
    }

    pub fn roster(&self) -> &[MemberId] {
        &self.roster
    }

    pub fn roles(&self) -> &PlayerRoles {
        &self.roles
    }

    pub fn game(&self) -> &GameStateMachine {
        &self.game
    }

    /// Mark held by the local identity
    pub fn local_mark(&self) -> Option<Mark> {
        self.roles.mark_of(&self.local)
    }

    /// Joined but not bound to a mark
    pub fn is_spectator(&self, member: &MemberId) -> bool {
        self.roster.contains(member) && !self.roles.is_player(member)
    }

    /// Drain all emitted events (caller's responsibility)
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbound)
    }

    // ===== Membership =====

    /// A member joined the channel; returns `false` if it was already known
    pub fn on_member_join(&mut self, member: MemberId) -> bool {
        if self.roster.contains(&member) {
            tracing::debug!("Member {} already in roster, skipping", member);
            return false;
        }

        self.roster.push(member.clone());
        tracing::info!(
            "Member {} joined (seat {}, {} present)",
            member,
            self.roster.len() - 1,
            self.roster.len()
        );

        if self.roles.is_complete() {
            tracing::info!("Roles already bound, {} observes as spectator", member);
            self.outbound.push(SessionEvent::SpectatorJoined { member });
            return true;
        }

        self.try_start();
        true
    }

    /// A member left the channel; returns `false` if it was unknown
    pub fn on_member_leave(&mut self, member: &MemberId) -> bool {
        let Some(position) = self.roster.iter().position(|m| m == member) else {
            tracing::debug!("Unknown member {} left, ignoring", member);
            return false;
        };
        self.roster.remove(position);

        if !self.roles.is_player(member) {
            tracing::info!("Spectator {} left", member);
            return true;
        }

        tracing::info!(
            "Player {} left during {}, resetting game",
            member,
            self.game.status()
        );
        self.roles.clear();
        self.game.reset();
        self.outbound.push(SessionEvent::GameReset);
        self.outbound.push(SessionEvent::BoardChanged {
            board: *self.game.board(),
        });

        self.try_start();
        if !self.roles.is_complete() {
            self.outbound.push(SessionEvent::WaitingForOpponent);
        }
        true
    }

    // ===== Game =====

    /// Validate a move by the local identity without applying it
    pub fn prepare_local_move(&self, cell: u8) -> Result<Move, SessionError> {
        let mark = self
            .local_mark()
            .ok_or_else(|| SessionError::RoleConflict(self.local.clone()))?;

        self.game.validate(mark, cell)?;

        Ok(Move {
            mark,
            cell,
            player: self.local.clone(),
        })
    }

    /// Apply a move from any origin
    ///
    /// Local moves go through here too, after they have been broadcast.
    pub fn apply_move(&mut self, mv: &Move) -> Result<MoveOutcome, SessionError> {
        let assigned = self
            .roles
            .mark_of(&mv.player)
            .ok_or_else(|| SessionError::RoleConflict(mv.player.clone()))?;

        if assigned != mv.mark {
            return Err(MoveError::MarkMismatch {
                player: mv.player.clone(),
                assigned,
                claimed: mv.mark,
            }
            .into());
        }

        let outcome = self.game.apply_move(mv)?;
        tracing::debug!("{} played {} at cell {}", mv.player, mv.mark, mv.cell);

        self.outbound.push(SessionEvent::BoardChanged {
            board: *self.game.board(),
        });
        match outcome {
            MoveOutcome::Continue { next } => {
                self.outbound.push(SessionEvent::TurnChanged { mark: next });
            }
            MoveOutcome::Ended(outcome) => {
                match outcome {
                    GameOutcome::Won(mark) => tracing::info!("Game won by {}", mark),
                    GameOutcome::Draw => tracing::info!("Game ended in a draw"),
                }
                self.outbound.push(SessionEvent::GameEnded { outcome });
            }
        }

        Ok(outcome)
    }

    /// Check that the local identity may ask for a new game
    pub fn prepare_rematch(&self) -> Result<(), SessionError> {
        if !self.roles.is_player(&self.local) {
            return Err(SessionError::RoleConflict(self.local.clone()));
        }

        let status = self.game.status();
        if !status.is_terminal() {
            return Err(SessionError::RematchNotAllowed(status));
        }

        Ok(())
    }

    /// A player asked for a new game; only honoured once the current one ended
    ///
    /// Returns `false` when the request is stale, e.g. both players asked at
    /// once and the other request already restarted the game.
    pub fn on_game_reset(&mut self, from: &MemberId) -> Result<bool, SessionError> {
        if !self.roles.is_player(from) {
            return Err(SessionError::RoleConflict(from.clone()));
        }

        let status = self.game.status();
        if !status.is_terminal() {
            tracing::debug!("Ignoring rematch from {} during {}", from, status);
            return Ok(false);
        }

        tracing::info!("Rematch requested by {}", from);
        self.outbound.push(SessionEvent::GameReset);
        self.start_game();
        Ok(true)
    }

    /// Another replica announced a game start; cross-check only
    pub fn on_game_started(&mut self, from: &MemberId, first_mark: Mark) -> Result<(), SessionError> {
        if !self.roles.is_player(from) {
            return Err(SessionError::RoleConflict(from.clone()));
        }

        if self.game.status() == GameStatus::WaitingForPlayers {
            tracing::debug!("{} announced a start before we paired up", from);
        } else if first_mark != self.game.first_mark() {
            tracing::warn!(
                "{} started with {} but this replica started with {}",
                from,
                first_mark,
                self.game.first_mark()
            );
        }

        Ok(())
    }

    /// Chat text from another member, surfaced for display only
    pub fn on_chat(&mut self, from: &MemberId, text: String) {
        tracing::debug!("Chat from {}: {}", from, text);
        self.outbound.push(SessionEvent::ChatReceived {
            from: from.clone(),
            text,
        });
    }

    // ===== Catch-up =====

    /// A player shared its view of the game after someone joined
    ///
    /// With the same binding as ours, moves we have not seen yet are replayed
    /// in order. A different binding is adopted only when the sender holds a
    /// seat in ours, we hold none in theirs and no move has been played in
    /// ours: our own partner reports that it plays someone else, so we paired
    /// up before we saw everyone.
    /// Returns `false` when there was nothing to catch up on.
    pub fn on_game_sync(
        &mut self,
        from: &MemberId,
        player_x: MemberId,
        player_o: MemberId,
        moves: &[PlayedMove],
    ) -> Result<bool, SessionError> {
        if player_x == player_o || !self.roster.contains(from) {
            return Err(SessionError::RoleConflict(from.clone()));
        }

        let roles = PlayerRoles::bind(player_x.clone(), player_o.clone());
        if roles.holder(Mark::X) != Some(&player_x) || !roles.is_player(from) {
            return Err(SessionError::RoleConflict(from.clone()));
        }

        if roles == self.roles {
            return self.catch_up(moves);
        }

        let unplayed = self.game.history().is_empty();
        if roles.is_player(&self.local) || !self.roles.is_player(from) || !unplayed {
            return Err(SessionError::RoleConflict(from.clone()));
        }

        let mut game = GameStateMachine::new();
        game.start(Mark::X);
        for mv in Self::attribute(&roles, moves)? {
            game.apply_move(&mv)?;
        }

        let had_seat = self.local_mark().is_some();
        tracing::info!(
            "{} reports {} (X) vs {} (O), following that game ({} move(s))",
            from,
            player_x,
            player_o,
            moves.len()
        );

        for member in [player_x, player_o] {
            if !self.roster.contains(&member) {
                self.roster.push(member);
            }
        }
        self.roles = roles;
        self.game = game;

        for (member, mark) in self.roles.assignments() {
            self.outbound.push(SessionEvent::RoleAssigned { member, mark });
        }
        if had_seat {
            self.outbound.push(SessionEvent::SpectatorJoined {
                member: self.local.clone(),
            });
        }
        self.push_game_state();

        Ok(true)
    }

    /// Replay the tail of `moves` we have not applied yet
    fn catch_up(&mut self, moves: &[PlayedMove]) -> Result<bool, SessionError> {
        let history = self.game.history();
        let seen = history.len();
        let extends = moves.len() > seen
            && history
                .iter()
                .zip(moves)
                .all(|(mv, played)| mv.mark == played.mark && mv.cell == played.cell);
        if !extends {
            return Ok(false);
        }

        let missing = Self::attribute(&self.roles, &moves[seen..])?;

        // All or nothing
        let mut scratch = self.game.clone();
        for mv in &missing {
            scratch.apply_move(mv)?;
        }

        tracing::info!("Catching up on {} missed move(s)", missing.len());
        for mv in &missing {
            self.apply_move(mv)?;
        }
        Ok(true)
    }

    /// Moves as this replica applies them, attributed to the mark holders
    fn attribute(roles: &PlayerRoles, moves: &[PlayedMove]) -> Result<Vec<Move>, SessionError> {
        moves
            .iter()
            .map(|played| {
                let player = roles.holder(played.mark).cloned().ok_or(
                    MoveError::GameNotInProgress(GameStatus::WaitingForPlayers),
                )?;
                Ok(Move {
                    mark: played.mark,
                    cell: played.cell,
                    player,
                })
            })
            .collect()
    }

    // ===== Internals =====

    fn push_game_state(&mut self) {
        self.outbound.push(SessionEvent::BoardChanged {
            board: *self.game.board(),
        });
        match self.game.status() {
            GameStatus::InProgress => self.outbound.push(SessionEvent::TurnChanged {
                mark: self.game.current_mark(),
            }),
            GameStatus::Won(mark) => self.outbound.push(SessionEvent::GameEnded {
                outcome: GameOutcome::Won(mark),
            }),
            GameStatus::Draw => self.outbound.push(SessionEvent::GameEnded {
                outcome: GameOutcome::Draw,
            }),
            GameStatus::WaitingForPlayers => {}
        }
    }

    /// Bind roles and start once two members are present
    fn try_start(&mut self) {
        if self.roles.is_complete() || self.roster.len() < 2 {
            return;
        }

        // Two smallest identities; with exactly two members that is the pair
        let mut candidates = self.roster.clone();
        candidates.sort();
        let mut candidates = candidates.into_iter();
        let (Some(first), Some(second)) = (candidates.next(), candidates.next()) else {
            return;
        };

        self.roles = PlayerRoles::bind(first, second);
        for (member, mark) in self.roles.assignments() {
            tracing::info!("{} plays {}", member, mark);
            self.outbound.push(SessionEvent::RoleAssigned { member, mark });
        }

        self.start_game();
    }

    fn start_game(&mut self) {
        self.game.start(Mark::X);
        self.outbound.push(SessionEvent::GameStarted {
            first_mark: Mark::X,
        });
        self.outbound.push(SessionEvent::BoardChanged {
            board: *self.game.board(),
        });
        self.outbound.push(SessionEvent::TurnChanged { mark: Mark::X });
    }
}

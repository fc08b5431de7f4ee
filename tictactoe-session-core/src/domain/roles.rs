use crate::domain::MemberId;
use crate::protocol::Mark;
use serde::{Deserialize, Serialize};

/// Binding of identities to marks for the current game
///
/// At most one identity per mark. Bindings come only from [`PlayerRoles::bind`],
/// which orders the pair itself, so replicas agree regardless of the order
/// in which they observed the joins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoles {
    x: Option<MemberId>,
    o: Option<MemberId>,
}

impl PlayerRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind two distinct identities: the lexicographically smaller plays X
    pub fn bind(first: MemberId, second: MemberId) -> Self {
        let (x, o) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };

        Self {
            x: Some(x),
            o: Some(o),
        }
    }

    /// Mark held by `member`, if any
    pub fn mark_of(&self, member: &MemberId) -> Option<Mark> {
        if self.x.as_ref() == Some(member) {
            Some(Mark::X)
        } else if self.o.as_ref() == Some(member) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Identity holding `mark`, if bound
    pub fn holder(&self, mark: Mark) -> Option<&MemberId> {
        match mark {
            Mark::X => self.x.as_ref(),
            Mark::O => self.o.as_ref(),
        }
    }

    pub fn is_player(&self, member: &MemberId) -> bool {
        self.mark_of(member).is_some()
    }

    /// Both marks are bound
    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.o.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.o.is_none()
    }

    /// Bound `(identity, mark)` pairs, X first
    pub fn assignments(&self) -> Vec<(MemberId, Mark)> {
        [Mark::X, Mark::O]
            .into_iter()
            .filter_map(|mark| self.holder(mark).map(|id| (id.clone(), mark)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.x = None;
        self.o = None;
    }
}

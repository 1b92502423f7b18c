//! One arena slot's adjacency.

use dh_core::AgentId;

/// Position of an agent relative to the chain root.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Leader,
    Follower,
}

/// Adjacency of a single agent.
///
/// A `Follower` with `parent == None` is ownerless: it is registered but not
/// in the chain.  The leader's `parent` is always `None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub role:   Role,
    pub parent: Option<AgentId>,
    pub child:  Option<AgentId>,
}

impl Link {
    pub(crate) fn leader() -> Self {
        Self { role: Role::Leader, parent: None, child: None }
    }

    pub(crate) fn ownerless() -> Self {
        Self { role: Role::Follower, parent: None, child: None }
    }

    #[inline]
    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    /// `true` for a follower that currently has a parent.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.role == Role::Follower && self.parent.is_some()
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.parent = None;
        self.child = None;
    }
}

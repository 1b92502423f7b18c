//! Intents: the actions a creature can request during its tick.

use dh_core::{AgentId, Facing, Vec2};

/// An action a duck wants performed this tick.
///
/// Chain intents (`AttachToLeader`, `AttachToTail`, `LeaveChain`) are applied
/// by the world.  Everything else is forwarded to the physics layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuckIntent {
    /// Pin the body at a point with zero velocity (floating).
    HoldAt(Vec2),
    /// Kinematic move to this position.
    MoveTo(Vec2),
    Face(Facing),
    /// One-off impulse before wandering.  Raised to observers as a duck jump.
    Jump { impulse: Vec2 },

    /// Join the chain behind whatever the tail is now.
    AttachToLeader,
    /// Join behind the tail the duck touched.
    AttachToTail { observed_tail: AgentId },
    /// Splice this duck out of the chain.
    LeaveChain,
    /// Carry the duck back to its spawn point.
    ReturnTo(Vec2),
}

/// An action an enemy wants performed this tick.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnemyIntent {
    MoveTo(Vec2),
    Face(Facing),
    /// Launch impulse.  Raised to observers as an enemy jump.
    Jump { impulse: Vec2 },
    /// Entered Chase from a calm state.
    Alerted,
    /// Impulse to apply to the leader.
    Knockback { impulse: Vec2 },
    /// Knock the last duck off the chain.
    StripTail,
}

impl DuckIntent {
    /// `true` for intents the world applies to the chain.
    #[inline]
    pub fn is_chain_intent(&self) -> bool {
        matches!(
            self,
            DuckIntent::AttachToLeader | DuckIntent::AttachToTail { .. } | DuckIntent::LeaveChain
        )
    }
}

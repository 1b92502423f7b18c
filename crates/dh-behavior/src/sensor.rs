//! Per-tick sensor snapshots.
//!
//! The physics layer owns overlap tests and raycasts.  It reports their
//! results here and the FSMs treat them as plain facts for one tick.

use dh_core::{AgentId, Facing, Vec2};

/// A chain member the duck's catch area touched this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatchContact {
    /// Overlap with the leader itself.
    Leader,
    /// Within catch radius of the follower that was the tail when the
    /// caller looked.
    Tail(AgentId),
}

/// Where a following duck should trail, filled in by the world from the
/// chain and the leader's state.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowTarget {
    pub parent_position: Vec2,
    pub leader_position: Vec2,
    pub leader_facing:   Facing,
}

/// Facts about one duck for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuckSensors {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,

    pub catch: Option<CatchContact>,
    /// Only meaningful while following.  `None` means the parent's position
    /// was not reported.
    pub follow: Option<FollowTarget>,

    /// The duck left the level bounds this tick.
    pub out_of_bounds:   bool,
    /// The physics layer finished moving a locked duck back to its spawn.
    pub return_complete: bool,
}

/// Result of the forward obstacle raycast.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleProbe {
    /// Distance along the facing direction to the first wall or ground hit.
    pub distance: f32,
    /// Height of the obstacle's top above the enemy's position, when the
    /// collider bounds are known.
    pub height:   Option<f32>,
}

/// Facts about one enemy for one tick.
///
/// `leader_contact` and `follower_contact` are contact-begin events: report
/// them on the tick the collision starts, not for every tick it persists.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemySensors {
    pub position: Vec2,
    pub grounded: bool,

    pub leader_position: Vec2,
    /// Line-of-sight ray reached the leader before any wall.
    pub leader_in_sight: bool,
    pub obstacle:        Option<ObstacleProbe>,
    /// Nothing solid within step-back distance behind the enemy.
    pub back_clear:      bool,

    pub leader_contact:   bool,
    pub follower_contact: bool,
}

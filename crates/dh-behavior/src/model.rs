//! The `Creature` trait: the seam the world drives both FSMs through.

use dh_core::{AgentRng, Vec2};

/// A per-agent state machine ticked once per frame.
///
/// The world owns one value per agent and calls [`tick`](Self::tick) in the
/// intent phase.  Implementations keep all multi-frame waits as state
/// variants, so a tick never blocks.
pub trait Creature {
    type Sensors;
    type Intent;

    /// Advance by `dt` seconds and return requested actions.
    ///
    /// Must return an empty `Vec` without touching any state while the
    /// creature is disabled.
    fn tick(&mut self, dt: f32, sensors: &Self::Sensors, rng: &mut AgentRng) -> Vec<Self::Intent>;

    /// `true` if the culler may switch this creature off right now.
    fn safe_to_deactivate(&self) -> bool;

    fn is_enabled(&self) -> bool;

    /// Switch simulation on or off.  Re-enabling resets the creature to its
    /// idle state at `position`.
    fn set_enabled(&mut self, enabled: bool, position: Vec2, rng: &mut AgentRng);
}

//! Duck behavior: float, hop, wander, follow.
//!
//! ```text
//!             grounded                  landed / timeout
//!  Floating ───────────▶ Jumping ──────────────────────▶ Wandering
//!     │                     │                               │
//!     └──── catch ──────────┴──────────── catch ────────────┘
//!                                 │
//!                                 ▼
//!                            Following ── detached ──▶ Wandering
//!
//!  any ── out of bounds ──▶ Locked ── return complete ──▶ Wandering(spawn)
//!  any ── delivered ──▶ Delivered
//! ```

use dh_core::{AgentRng, Countdown, Facing, Vec2};

use crate::motion::{duck_hop_direction, smooth_damp};
use crate::{CatchContact, Creature, DuckIntent, DuckSensors, DuckTuning};

// ── DuckState ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuckState {
    /// Pinned at `home`, turning around every few seconds.
    Floating { home: Vec2, flip_in: Countdown },
    /// Pre-wander hop in progress.
    Jumping { seen_airborne: bool, elapsed: f32 },
    /// Oscillating around `anchor`.
    Wandering { anchor: Vec2, elapsed: f32 },
    Following,
    /// Out of bounds, waiting to be carried back to spawn.
    Locked,
    /// Handed in at the exit.  Terminal.
    Delivered,
}

impl DuckState {
    pub fn name(&self) -> &'static str {
        match self {
            DuckState::Floating { .. } => "Floating",
            DuckState::Jumping { .. } => "Jumping",
            DuckState::Wandering { .. } => "Wandering",
            DuckState::Following => "Following",
            DuckState::Locked => "Locked",
            DuckState::Delivered => "Delivered",
        }
    }
}

// ── DuckFsm ───────────────────────────────────────────────────────────────────

/// One duck's state machine.
///
/// The chain link lives in `dh-chain`; this type only knows whether it
/// believes it is following.  The world keeps the two in step by calling
/// [`cancel_follow`](Self::cancel_follow) when an attach is refused and
/// [`on_detached`](Self::on_detached) when the chain drops the duck.
#[derive(Clone, Debug)]
pub struct DuckFsm {
    tuning:   DuckTuning,
    state:    DuckState,
    /// State to restore if an optimistic attach is rejected.
    pre_follow: Option<DuckState>,
    spawn:    Vec2,
    facing:   Facing,
    /// Smooth-damp velocity while following.
    follow_velocity: Vec2,
    enabled:  bool,
}

impl DuckFsm {
    pub fn new(tuning: DuckTuning, spawn: Vec2, rng: &mut AgentRng) -> Self {
        let state = Self::floating_at(&tuning, spawn, rng);
        Self {
            tuning,
            state,
            pre_follow: None,
            spawn,
            facing: Facing::default(),
            follow_velocity: Vec2::ZERO,
            enabled: true,
        }
    }

    fn floating_at(tuning: &DuckTuning, home: Vec2, rng: &mut AgentRng) -> DuckState {
        DuckState::Floating {
            home,
            flip_in: Countdown::new(rng.range_f32(tuning.float_flip_min, tuning.float_flip_max)),
        }
    }

    #[inline]
    pub fn state(&self) -> &DuckState {
        &self.state
    }

    #[inline]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    #[inline]
    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    #[inline]
    pub fn tuning(&self) -> &DuckTuning {
        &self.tuning
    }

    #[inline]
    pub fn is_following(&self) -> bool {
        self.state == DuckState::Following
    }

    #[inline]
    pub fn is_delivered(&self) -> bool {
        self.state == DuckState::Delivered
    }

    /// Current wander anchor, if wandering.
    pub fn anchor(&self) -> Option<Vec2> {
        match self.state {
            DuckState::Wandering { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    // ── World callbacks ───────────────────────────────────────────────────

    /// The chain refused the attach this duck asked for; go back to what it
    /// was doing.
    pub fn cancel_follow(&mut self) {
        if self.state != DuckState::Following {
            return;
        }
        let restored = self.pre_follow.take().unwrap_or(DuckState::Wandering {
            anchor:  self.spawn,
            elapsed: 0.0,
        });
        log::debug!("attach refused, duck back to {}", restored.name());
        self.state = restored;
    }

    /// The chain detached this duck (enemy hit or tail strip).  It lands
    /// where it is and starts wandering there.
    pub fn on_detached(&mut self, position: Vec2) {
        if self.state != DuckState::Following {
            return;
        }
        self.pre_follow = None;
        self.follow_velocity = Vec2::ZERO;
        self.state = DuckState::Wandering { anchor: position, elapsed: 0.0 };
    }

    /// Handed in at the exit.
    pub fn deliver(&mut self) {
        self.pre_follow = None;
        self.follow_velocity = Vec2::ZERO;
        self.state = DuckState::Delivered;
    }

    // ── Per-state updates ─────────────────────────────────────────────────

    fn begin_follow(&mut self, contact: CatchContact, out: &mut Vec<DuckIntent>) {
        self.pre_follow = Some(std::mem::replace(&mut self.state, DuckState::Following));
        self.follow_velocity = Vec2::ZERO;
        out.push(match contact {
            CatchContact::Leader => DuckIntent::AttachToLeader,
            CatchContact::Tail(observed_tail) => DuckIntent::AttachToTail { observed_tail },
        });
    }

    fn start_hop(&mut self, velocity: Vec2, out: &mut Vec<DuckIntent>) {
        let impulse = duck_hop_direction(velocity) * self.tuning.jump_force;
        out.push(DuckIntent::Jump { impulse });
        self.state = DuckState::Jumping { seen_airborne: false, elapsed: 0.0 };
    }

    fn float(&mut self, dt: f32, s: &DuckSensors, rng: &mut AgentRng, out: &mut Vec<DuckIntent>) {
        let DuckState::Floating { home, flip_in } = &mut self.state else { return };
        let home = *home;

        if s.grounded {
            self.start_hop(s.velocity, out);
            return;
        }

        if flip_in.tick(dt) {
            *flip_in = Countdown::new(rng.range_f32(self.tuning.float_flip_min, self.tuning.float_flip_max));
            self.facing = self.facing.flipped();
            out.push(DuckIntent::Face(self.facing));
        }
        out.push(DuckIntent::HoldAt(home));
    }

    fn hop(&mut self, dt: f32, s: &DuckSensors) {
        let DuckState::Jumping { seen_airborne, elapsed } = &mut self.state else { return };
        *elapsed += dt;
        if !s.grounded {
            *seen_airborne = true;
        }
        let landed = *seen_airborne && s.grounded;
        if landed || *elapsed >= self.tuning.jump_timeout_secs {
            self.state = DuckState::Wandering { anchor: s.position, elapsed: 0.0 };
        }
    }

    fn wander(&mut self, dt: f32, s: &DuckSensors, out: &mut Vec<DuckIntent>) {
        let DuckState::Wandering { anchor, elapsed } = &mut self.state else { return };
        *elapsed += dt;
        let offset = (*elapsed * self.tuning.wander_speed).sin() * self.tuning.wander_amplitude;
        let target = Vec2::new(anchor.x + offset, anchor.y);

        let facing = Facing::toward(target.x - s.position.x, 0.0, self.facing);
        if facing != self.facing {
            self.facing = facing;
            out.push(DuckIntent::Face(facing));
        }
        out.push(DuckIntent::MoveTo(target));
    }

    fn follow(&mut self, dt: f32, s: &DuckSensors, out: &mut Vec<DuckIntent>) {
        let Some(t) = s.follow else {
            log::trace!("following duck has no parent position this tick");
            return;
        };
        // Trail on the side away from where the leader is looking.
        let target = Vec2::new(
            t.parent_position.x - t.leader_facing.sign() * self.tuning.follow_offset,
            t.leader_position.y,
        );
        let next = smooth_damp(s.position, target, &mut self.follow_velocity, self.tuning.smooth_time, dt);

        if t.leader_facing != self.facing {
            self.facing = t.leader_facing;
            out.push(DuckIntent::Face(self.facing));
        }
        out.push(DuckIntent::MoveTo(next));
    }
}

impl Creature for DuckFsm {
    type Sensors = DuckSensors;
    type Intent = DuckIntent;

    fn tick(&mut self, dt: f32, s: &DuckSensors, rng: &mut AgentRng) -> Vec<DuckIntent> {
        if !self.enabled || self.state == DuckState::Delivered {
            return Vec::new();
        }
        let mut out = Vec::new();

        if self.state == DuckState::Locked {
            if s.return_complete {
                self.state = DuckState::Wandering { anchor: self.spawn, elapsed: 0.0 };
            }
            return out;
        }

        if s.out_of_bounds {
            if self.state == DuckState::Following {
                out.push(DuckIntent::LeaveChain);
            }
            self.pre_follow = None;
            self.follow_velocity = Vec2::ZERO;
            self.state = DuckState::Locked;
            out.push(DuckIntent::ReturnTo(self.spawn));
            return out;
        }

        if self.state != DuckState::Following {
            if let Some(contact) = s.catch {
                self.begin_follow(contact, &mut out);
                return out;
            }
        }

        match self.state {
            DuckState::Floating { .. } => self.float(dt, s, rng, &mut out),
            DuckState::Jumping { .. } => self.hop(dt, s),
            DuckState::Wandering { .. } => self.wander(dt, s, &mut out),
            DuckState::Following => self.follow(dt, s, &mut out),
            DuckState::Locked | DuckState::Delivered => {}
        }
        out
    }

    /// Only a floating duck can be switched off: it is not following and
    /// still in the air.
    fn safe_to_deactivate(&self) -> bool {
        matches!(self.state, DuckState::Floating { .. })
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool, position: Vec2, rng: &mut AgentRng) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled && self.state != DuckState::Delivered {
            self.pre_follow = None;
            self.follow_velocity = Vec2::ZERO;
            self.state = Self::floating_at(&self.tuning, position, rng);
        }
    }
}

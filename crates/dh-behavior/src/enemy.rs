//! Enemy behavior: patrol, chase, obstacle jump, attack.
//!
//! Alertness sits above the state machine.  A line-of-sight hit arms a
//! countdown of `alert_secs`; while the leader is in sight or the countdown
//! is running the enemy chases, and once it expires without a fresh sighting
//! the enemy drops back to patrol.
//!
//! The countdown counts as expired once less than [`TIMER_EPSILON`] is left,
//! so unseen time within that slack of `alert_secs` already ends the chase.
//! Anything short of `alert_secs - TIMER_EPSILON` keeps it going.
//!
//! [`TIMER_EPSILON`]: dh_core::TIMER_EPSILON

use dh_core::{AgentRng, Countdown, Facing, Vec2};

use crate::motion::{adaptive_launch, jump_trigger_distance, knockback, move_towards, projectile_launch};
use crate::{Creature, EnemyIntent, EnemySensors, EnemyTuning};

/// Horizontal distance treated as "arrived" when chasing.
const CHASE_SNAP: f32 = 0.05;
/// Squared distance treated as "arrived" on a patrol leg.
const PATROL_SNAP_SQ: f32 = 0.05;
/// Movement per tick below which a patrol leg counts as stalled.
const STALL_SQ: f32 = 0.001;
/// Drop below the leg's start height that aborts the leg.
const FALL_MARGIN: f32 = 0.1;
/// Distance at which the step back is considered done.
const STEP_BACK_SNAP: f32 = 0.1;

// ── States ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatrolPhase {
    /// Choose the next leg on the coming tick.
    Pick,
    Walking {
        target:      Vec2,
        start_y:     f32,
        last:        Vec2,
        stuck_ticks: u32,
    },
    Waiting { remaining: Countdown },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JumpPhase {
    StepBack { target: Vec2, direction: Vec2 },
    Pause { remaining: Countdown, direction: Vec2 },
    Airborne { elapsed: f32, left_ground: bool },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnemyState {
    Patrol(PatrolPhase),
    Chase,
    Jump(JumpPhase),
    Attack { remaining: Countdown },
}

impl EnemyState {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyState::Patrol(_) => "Patrol",
            EnemyState::Chase => "Chase",
            EnemyState::Jump(_) => "Jump",
            EnemyState::Attack { .. } => "Attack",
        }
    }

    #[inline]
    pub fn is_patrol(&self) -> bool {
        matches!(self, EnemyState::Patrol(_))
    }

    #[inline]
    pub fn is_chase(&self) -> bool {
        matches!(self, EnemyState::Chase)
    }
}

// ── EnemyFsm ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct EnemyFsm {
    tuning:  EnemyTuning,
    state:   EnemyState,
    /// `Some` while the alertness countdown is running.
    alert:   Option<Countdown>,
    facing:  Facing,
    enabled: bool,
}

impl EnemyFsm {
    pub fn new(tuning: EnemyTuning) -> Self {
        Self {
            tuning,
            state: EnemyState::Patrol(PatrolPhase::Pick),
            alert: None,
            facing: Facing::default(),
            enabled: true,
        }
    }

    #[inline]
    pub fn state(&self) -> &EnemyState {
        &self.state
    }

    #[inline]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    #[inline]
    pub fn tuning(&self) -> &EnemyTuning {
        &self.tuning
    }

    /// `true` while the alertness countdown is running.
    #[inline]
    pub fn is_alert(&self) -> bool {
        self.alert.is_some()
    }

    /// Seconds left on the alertness countdown.
    pub fn alert_remaining(&self) -> f32 {
        self.alert.map_or(0.0, |c| c.remaining())
    }

    /// Speed for the current mode.
    pub fn current_speed(&self) -> f32 {
        match self.state {
            EnemyState::Patrol(_) => self.tuning.move_speed,
            _ => self.tuning.chase_speed(),
        }
    }

    fn refresh_alert(&mut self) {
        self.alert = Some(Countdown::new(self.tuning.alert_secs));
    }

    fn face(&mut self, dx: f32, out: &mut Vec<EnemyIntent>) {
        let facing = Facing::toward(dx, self.tuning.flip_threshold, self.facing);
        if facing != self.facing {
            self.facing = facing;
            out.push(EnemyIntent::Face(facing));
        }
    }

    fn set_state(&mut self, next: EnemyState) {
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.state) {
            log::debug!("enemy {} -> {}", self.state.name(), next.name());
        }
        self.state = next;
    }

    /// Where calm or alert creatures go once a jump or attack is over.
    fn settle(&mut self, aggressive: bool) {
        self.set_state(if aggressive { EnemyState::Chase } else { EnemyState::Patrol(PatrolPhase::Pick) });
    }

    // ── Patrol ────────────────────────────────────────────────────────────

    fn patrol(&mut self, dt: f32, s: &EnemySensors, rng: &mut AgentRng, out: &mut Vec<EnemyIntent>) {
        let EnemyState::Patrol(phase) = &mut self.state else { return };

        if let PatrolPhase::Waiting { remaining } = phase {
            if !remaining.tick(dt) {
                return;
            }
            *phase = PatrolPhase::Pick;
        }

        if *phase == PatrolPhase::Pick {
            let t = &self.tuning;
            let span = rng.range_f32(t.patrol_span_min, t.patrol_span_max);
            let distance = rng.range_f32(-span, span);
            *phase = PatrolPhase::Walking {
                target:      Vec2::new(s.position.x + distance, s.position.y),
                start_y:     s.position.y,
                last:        s.position,
                stuck_ticks: 0,
            };
        }

        let PatrolPhase::Walking { target, start_y, last, stuck_ticks } = phase else { return };
        let target = *target;
        let to_target = target - s.position;

        let leg_done = if !s.grounded || s.position.y < *start_y - FALL_MARGIN {
            true
        } else if to_target.length_squared() <= PATROL_SNAP_SQ {
            out.push(EnemyIntent::MoveTo(target));
            true
        } else {
            if (s.position - *last).length_squared() < STALL_SQ {
                *stuck_ticks += 1;
            } else {
                *stuck_ticks = 0;
            }
            *last = s.position;
            if *stuck_ticks > self.tuning.stuck_tick_limit {
                true
            } else {
                let step = to_target.normalize_or_zero() * self.tuning.move_speed * dt;
                out.push(EnemyIntent::MoveTo(s.position + step));
                false
            }
        };

        if leg_done {
            let wait = rng.range_f32(self.tuning.patrol_wait_min, self.tuning.patrol_wait_max);
            *phase = PatrolPhase::Waiting { remaining: Countdown::new(wait) };
        }
        self.face(to_target.x, out);
    }

    // ── Chase ─────────────────────────────────────────────────────────────

    fn chase(&mut self, dt: f32, s: &EnemySensors, out: &mut Vec<EnemyIntent>) {
        if !s.grounded {
            return;
        }

        let ratio = self.current_speed() / self.tuning.move_speed;
        let trigger = jump_trigger_distance(self.tuning.jump_base_distance, ratio);
        if let Some(obstacle) = s.obstacle.filter(|o| o.distance < trigger) {
            let direction = match obstacle.height {
                Some(h) if obstacle.distance <= self.tuning.jump_start_distance => {
                    projectile_launch(h, obstacle.distance, self.facing, self.tuning.gravity)
                }
                _ => adaptive_launch(s.leader_position - s.position),
            };
            let phase = if s.back_clear && self.tuning.step_back_distance > 0.0 {
                JumpPhase::StepBack {
                    target: s.position - self.facing.as_vec2() * self.tuning.step_back_distance,
                    direction,
                }
            } else {
                JumpPhase::Pause { remaining: Countdown::new(self.tuning.jump_pause_secs), direction }
            };
            self.set_state(EnemyState::Jump(phase));
            return;
        }

        let dx = s.leader_position.x - s.position.x;
        self.face(dx, out);
        let max_step = self.tuning.chase_speed() * dt;
        let next = if dx.abs() <= CHASE_SNAP || dx.abs() < max_step {
            Vec2::new(s.leader_position.x, s.position.y)
        } else {
            Vec2::new(s.position.x + dx.signum() * max_step, s.position.y)
        };
        out.push(EnemyIntent::MoveTo(next));
    }

    // ── Jump ──────────────────────────────────────────────────────────────

    fn jump(&mut self, dt: f32, s: &EnemySensors, aggressive: bool, rng: &mut AgentRng, out: &mut Vec<EnemyIntent>) {
        let EnemyState::Jump(phase) = &mut self.state else { return };

        if let JumpPhase::StepBack { target, direction } = phase {
            let next = move_towards(s.position, *target, self.tuning.step_back_speed * dt);
            out.push(EnemyIntent::MoveTo(next));
            if next.distance(*target) > STEP_BACK_SNAP {
                return;
            }
            *phase = JumpPhase::Pause {
                remaining: Countdown::new(self.tuning.jump_pause_secs),
                direction: *direction,
            };
            return;
        }

        if let JumpPhase::Pause { remaining, direction } = phase {
            if !remaining.tick(dt) {
                return;
            }
            let scale = rng.range_f32(1.0, self.tuning.jump_force_spread);
            let impulse = *direction * self.tuning.jump_force * scale;
            out.push(EnemyIntent::Jump { impulse });
            *phase = JumpPhase::Airborne { elapsed: 0.0, left_ground: false };
            return;
        }

        if let JumpPhase::Airborne { elapsed, left_ground } = phase {
            *elapsed += dt;
            if !s.grounded {
                *left_ground = true;
            }
            let landed = *left_ground && s.grounded;
            if landed || *elapsed >= self.tuning.air_control_secs {
                self.settle(aggressive);
            }
        }
    }
}

impl Creature for EnemyFsm {
    type Sensors = EnemySensors;
    type Intent = EnemyIntent;

    fn tick(&mut self, dt: f32, s: &EnemySensors, rng: &mut AgentRng) -> Vec<EnemyIntent> {
        if !self.enabled {
            return Vec::new();
        }
        let mut out = Vec::new();

        // ── Alertness ─────────────────────────────────────────────────────
        if s.leader_in_sight {
            self.refresh_alert();
        } else if let Some(countdown) = &mut self.alert {
            if countdown.tick(dt) {
                self.alert = None;
            }
        }
        let aggressive = s.leader_in_sight || self.alert.is_some();

        // ── Contacts ──────────────────────────────────────────────────────
        let attacking = matches!(self.state, EnemyState::Attack { .. });
        if s.leader_contact && !attacking {
            if self.state.is_patrol() {
                out.push(EnemyIntent::Alerted);
            }
            out.push(EnemyIntent::Knockback {
                impulse: knockback(s.position, s.leader_position, self.tuning.kick_lift, self.tuning.kick_power),
            });
            out.push(EnemyIntent::StripTail);
            self.refresh_alert();
            self.face(s.leader_position.x - s.position.x, &mut out);
            self.set_state(EnemyState::Attack { remaining: Countdown::new(self.tuning.attack_pulse_secs) });
            return out;
        }
        if s.follower_contact {
            out.push(EnemyIntent::StripTail);
        }

        // ── Mode switch ───────────────────────────────────────────────────
        if let EnemyState::Attack { remaining } = &mut self.state {
            if remaining.tick(dt) {
                self.settle(aggressive);
            }
            return out;
        }
        if matches!(self.state, EnemyState::Jump(_)) {
            self.jump(dt, s, aggressive, rng, &mut out);
            return out;
        }
        if aggressive && self.state.is_patrol() {
            out.push(EnemyIntent::Alerted);
            self.face(s.leader_position.x - s.position.x, &mut out);
            self.set_state(EnemyState::Chase);
        } else if !aggressive && self.state.is_chase() {
            self.set_state(EnemyState::Patrol(PatrolPhase::Pick));
        }

        match self.state {
            EnemyState::Patrol(_) => self.patrol(dt, s, rng, &mut out),
            EnemyState::Chase => self.chase(dt, s, &mut out),
            _ => {}
        }
        out
    }

    fn safe_to_deactivate(&self) -> bool {
        self.state.is_patrol()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool, _position: Vec2, _rng: &mut AgentRng) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.alert = None;
            self.state = EnemyState::Patrol(PatrolPhase::Pick);
        }
    }
}

//! Tunable constants for both creatures.
//!
//! Defaults reproduce the shipped game feel.

use crate::{BehaviorError, BehaviorResult};

// ── DuckTuning ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DuckTuning {
    /// Radius around the catch point within which the leader or tail is
    /// caught.  Default: 0.75.
    pub catch_radius:      f32,
    /// Vertical offset of the catch point from the duck's position.
    pub catch_offset_y:    f32,
    pub wander_amplitude:  f32,
    /// Angular speed of the wander oscillation, rad/s.
    pub wander_speed:      f32,
    pub jump_force:        f32,
    /// Smooth-damp time constant for following, seconds.
    pub smooth_time:       f32,
    /// Horizontal gap behind the parent.  The sprite width in game units.
    pub follow_offset:     f32,
    /// Range of the random floating facing-flip interval, seconds.
    pub float_flip_min:    f32,
    pub float_flip_max:    f32,
    /// Give up waiting for the landing after this long.
    pub jump_timeout_secs: f32,
}

impl Default for DuckTuning {
    fn default() -> Self {
        Self {
            catch_radius:      0.75,
            catch_offset_y:    -0.15,
            wander_amplitude:  1.0,
            wander_speed:      2.0,
            jump_force:        5.0,
            smooth_time:       0.1,
            follow_offset:     1.0,
            float_flip_min:    2.0,
            float_flip_max:    7.0,
            jump_timeout_secs: 3.0,
        }
    }
}

impl DuckTuning {
    pub fn validate(&self) -> BehaviorResult<()> {
        positive("catch_radius", self.catch_radius)?;
        if !self.catch_offset_y.is_finite() {
            return Err(BehaviorError::Config("catch_offset_y must be finite".into()));
        }
        non_negative("wander_amplitude", self.wander_amplitude)?;
        non_negative("wander_speed", self.wander_speed)?;
        non_negative("jump_force", self.jump_force)?;
        positive("smooth_time", self.smooth_time)?;
        non_negative("follow_offset", self.follow_offset)?;
        ordered("float_flip", self.float_flip_min, self.float_flip_max)?;
        positive("jump_timeout_secs", self.jump_timeout_secs)
    }
}

// ── EnemyTuning ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnemyTuning {
    /// Patrol speed, units/s.
    pub move_speed:         f32,
    /// Chase speed is `move_speed * chase_multiplier`.
    pub chase_multiplier:   f32,
    /// Alertness window after losing sight of the leader, seconds.
    pub alert_secs:         f32,
    pub jump_force:         f32,
    /// Upper bound of the random impulse multiplier (lower bound is 1).
    pub jump_force_spread:  f32,
    pub kick_power:         f32,
    /// Lift added to the knockback direction before scaling.
    pub kick_lift:          f32,
    /// Obstacle distance that triggers a jump at zero speed.
    pub jump_base_distance: f32,
    /// Obstacles closer than this use the projectile launch.
    pub jump_start_distance: f32,
    pub gravity:            f32,
    pub step_back_distance: f32,
    pub step_back_speed:    f32,
    /// Pause between the step back and the launch, seconds.
    pub jump_pause_secs:    f32,
    pub air_control_secs:   f32,
    pub attack_pulse_secs:  f32,

    pub patrol_span_min:    f32,
    pub patrol_span_max:    f32,
    pub patrol_wait_min:    f32,
    pub patrol_wait_max:    f32,
    /// Consecutive stalled ticks before a patrol leg is abandoned.
    pub stuck_tick_limit:   u32,
    /// Horizontal movement below this keeps the current facing.
    pub flip_threshold:     f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            move_speed:          5.0,
            chase_multiplier:    1.5,
            alert_secs:          10.0,
            jump_force:          20.0,
            jump_force_spread:   1.2,
            kick_power:          30.0,
            kick_lift:           0.7,
            jump_base_distance:  1.5,
            jump_start_distance: 2.0,
            gravity:             9.81,
            step_back_distance:  0.5,
            step_back_speed:     8.0,
            jump_pause_secs:     0.1,
            air_control_secs:    1.5,
            attack_pulse_secs:   0.3,
            patrol_span_min:     0.2,
            patrol_span_max:     10.0,
            patrol_wait_min:     1.0,
            patrol_wait_max:     2.5,
            stuck_tick_limit:    20,
            flip_threshold:      0.01,
        }
    }
}

impl EnemyTuning {
    #[inline]
    pub fn chase_speed(&self) -> f32 {
        self.move_speed * self.chase_multiplier
    }

    pub fn validate(&self) -> BehaviorResult<()> {
        positive("move_speed", self.move_speed)?;
        positive("chase_multiplier", self.chase_multiplier)?;
        positive("alert_secs", self.alert_secs)?;
        non_negative("jump_force", self.jump_force)?;
        if !(self.jump_force_spread >= 1.0) {
            return Err(BehaviorError::Config(format!(
                "jump_force_spread must be at least 1, got {}",
                self.jump_force_spread
            )));
        }
        non_negative("kick_power", self.kick_power)?;
        positive("jump_base_distance", self.jump_base_distance)?;
        non_negative("jump_start_distance", self.jump_start_distance)?;
        positive("gravity", self.gravity)?;
        non_negative("step_back_distance", self.step_back_distance)?;
        positive("step_back_speed", self.step_back_speed)?;
        non_negative("jump_pause_secs", self.jump_pause_secs)?;
        positive("air_control_secs", self.air_control_secs)?;
        positive("attack_pulse_secs", self.attack_pulse_secs)?;
        ordered("patrol_span", self.patrol_span_min, self.patrol_span_max)?;
        ordered("patrol_wait", self.patrol_wait_min, self.patrol_wait_max)?;
        non_negative("flip_threshold", self.flip_threshold)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn positive(name: &str, v: f32) -> BehaviorResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(BehaviorError::Config(format!("{name} must be positive, got {v}")))
    }
}

fn non_negative(name: &str, v: f32) -> BehaviorResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(BehaviorError::Config(format!("{name} must be non-negative, got {v}")))
    }
}

fn ordered(name: &str, lo: f32, hi: f32) -> BehaviorResult<()> {
    non_negative(name, lo)?;
    non_negative(name, hi)?;
    if lo <= hi {
        Ok(())
    } else {
        Err(BehaviorError::Config(format!("{name} range is inverted: {lo} > {hi}")))
    }
}

//! Small kinematics helpers shared by the FSMs.

use dh_core::{Facing, Vec2};

/// Critically damped spring toward `target`.
///
/// `velocity` carries state between calls and must be kept per agent.  The
/// result never overshoots `target`.
pub fn smooth_damp(current: Vec2, target: Vec2, velocity: &mut Vec2, smooth_time: f32, dt: f32) -> Vec2 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec2::ZERO;
    }
    output
}

/// Launch direction for a duck's pre-wander hop.
///
/// Mirrors the horizontal velocity so the duck bounces back the way it came.
/// At rest it hops up and slightly left, at 110°.
pub fn duck_hop_direction(velocity: Vec2) -> Vec2 {
    let dir = velocity.normalize_or_zero();
    if dir == Vec2::ZERO {
        let angle = 110f32.to_radians();
        Vec2::new(angle.cos(), angle.sin())
    } else {
        Vec2::new(-dir.x, dir.y).normalize_or_zero()
    }
}

/// Obstacle distance under which a chasing enemy starts a jump.
///
/// `speed_ratio` is current over default speed and is clamped to `[0, 1]`.
#[inline]
pub fn jump_trigger_distance(base: f32, speed_ratio: f32) -> f32 {
    base * (1.0 + speed_ratio.clamp(0.0, 1.0))
}

/// Unit launch direction that clears an obstacle `height` above and
/// `distance` ahead, with one unit of margin on both.
pub fn projectile_launch(height: f32, distance: f32, facing: Facing, gravity: f32) -> Vec2 {
    let g = gravity.abs().max(1e-4);
    let vy = (2.0 * g * (height + 1.0).max(0.0)).sqrt();
    let vx = if vy > 0.0 { (distance + 1.0) / (vy / g) } else { distance + 1.0 };
    Vec2::new(facing.sign() * vx, vy).normalize_or_zero()
}

/// Fallback launch toward the leader when the obstacle shape is unknown.
pub fn adaptive_launch(to_leader: Vec2) -> Vec2 {
    let horizontal = if to_leader.x < 0.0 { -1.0 } else { 1.0 };
    let vertical = (to_leader.x.abs() * 0.3).clamp(0.8, 1.5);
    Vec2::new(horizontal, vertical).normalize_or_zero()
}

/// Impulse an enemy gives the leader on contact.
pub fn knockback(enemy: Vec2, leader: Vec2, lift: f32, power: f32) -> Vec2 {
    let mut dir = (leader - enemy).normalize_or_zero();
    dir.y += lift;
    dir * power
}

/// Step of at most `max_step` from `from` toward `to`.
pub fn move_towards(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_step || dist == 0.0 {
        to
    } else {
        from + delta / dist * max_step
    }
}

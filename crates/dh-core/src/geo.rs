//! 2-D geometry helpers on top of `glam::Vec2`.
//!
//! World units follow the original level scale: one unit is roughly one tile,
//! `+y` is up.

pub use glam::Vec2;

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle stored as a min corner plus size.
///
/// `contains` is half-open on the max edges, so two rectangles that share an
/// edge never both claim a point on it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min:  Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Rectangle of `width × height` centred on `center`.
    #[inline]
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            min:  Vec2::new(center.x - width * 0.5, center.y - height * 0.5),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x < max.x && p.y >= self.min.y && p.y < max.y
    }

    /// Same centre, both sides scaled by `(1 + fraction)`.
    pub fn expanded(&self, fraction: f32) -> Rect {
        let scale = 1.0 + fraction;
        Rect::from_center(self.center(), self.size.x * scale, self.size.y * scale)
    }
}

// ── Facing ────────────────────────────────────────────────────────────────────

/// Horizontal facing of a sprite-driven agent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// `-1.0` for left, `1.0` for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Unit vector pointing the way this agent faces.
    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.sign(), 0.0)
    }

    /// Facing implied by horizontal motion `dx`.
    ///
    /// Movement smaller than `threshold` keeps `current`, which stops sprites
    /// from jittering when an agent is nearly stationary.
    #[inline]
    pub fn toward(dx: f32, threshold: f32, current: Facing) -> Facing {
        if dx.abs() <= threshold {
            current
        } else if dx < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

//! Simulation time model.
//!
//! # Design
//!
//! The external game loop calls the world once per frame with the frame's
//! `dt` in seconds.  Two clocks run side by side:
//!
//! - a monotonically increasing `Tick` counter (one per `World::tick` call),
//!   used to order events and for logging;
//! - an `f64` accumulator of elapsed seconds, used by anything that needs a
//!   continuous phase (wander oscillation, culling interval).
//!
//! Multi-frame waits ("bob for 2–7 s", "stay alert for 10 s") are modelled as
//! [`Countdown`] fields inside FSM states, polled once per tick.  Nothing
//! suspends.

use std::fmt;

/// Slack used when comparing accumulated `f32` timers against their limit.
///
/// Summing 0.1 ten times in `f32` gives 1.0000001, summing 0.2 five times
/// gives 0.99999994; without slack a countdown could end a tick late.
pub const TIMER_EPSILON: f32 = 1e-4;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tick counter plus accumulated game time.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The current tick, advanced by [`SimClock::advance`] each frame.
    pub current_tick: Tick,
    /// Total game seconds since tick 0.
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick of `dt` seconds.
    ///
    /// Negative `dt` is treated as zero; the clock never runs backwards.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.elapsed_secs += dt.max(0.0) as f64;
    }

    /// Elapsed game time as `f32`, for phase computations.
    #[inline]
    pub fn elapsed_f32(&self) -> f32 {
        self.elapsed_secs as f32
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.current_tick, self.elapsed_secs)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the world builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Step used by fixed-rate drivers, in seconds.  Default: 0.02 (50 Hz).
    pub fixed_step_secs: f32,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Ticks to simulate for drivers that run a bounded loop.  `0` means the
    /// driver decides.
    pub total_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_step_secs: 0.02,
            seed:            0,
            total_ticks:     0,
        }
    }
}

impl SimConfig {
    /// The tick at which a bounded run ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject step sizes that would stall or explode the FSM timers.
    pub fn validate(&self) -> crate::DhResult<()> {
        if !(self.fixed_step_secs.is_finite() && self.fixed_step_secs > 0.0) {
            return Err(crate::DhError::Config(format!(
                "fixed_step_secs must be positive, got {}",
                self.fixed_step_secs
            )));
        }
        Ok(())
    }
}

// ── Countdown ─────────────────────────────────────────────────────────────────

/// A one-shot timer that runs down by `dt` each tick.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Countdown {
    duration:  f32,
    remaining: f32,
}

impl Countdown {
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self { duration, remaining: duration }
    }

    /// Run down by `dt` and report whether the timer has expired.
    #[inline]
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt.max(0.0);
        self.is_finished()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining <= TIMER_EPSILON
    }

    /// Restart from the full duration.
    #[inline]
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds run down since the last reset.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        (self.duration - self.remaining).max(0.0)
    }
}

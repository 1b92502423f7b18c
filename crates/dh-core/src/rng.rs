//! Deterministic per-agent RNG.
//!
//! # Determinism strategy
//!
//! Each duck and enemy gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR ((stream_salt + id) * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids uniformly across the seed space.  Ducks and
//! enemies use different salts so `AgentId(3)` and `EnemyId(3)` never share a
//! stream.  Spawning more agents never disturbs the seeds of existing ones,
//! so a replay with the same seed and inputs is bit-identical.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, EnemyId};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Salt separating the enemy stream space from the agent stream space.
const ENEMY_SALT: u64 = 1 << 32;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Create one per duck or enemy at spawn and keep it next to the agent's FSM.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        Self::from_stream(global_seed, agent.0 as u64)
    }

    /// Seed deterministically from the run's global seed and an enemy ID.
    pub fn for_enemy(global_seed: u64, enemy: EnemyId) -> Self {
        Self::from_stream(global_seed, ENEMY_SALT + enemy.0 as u64)
    }

    fn from_stream(global_seed: u64, stream: u64) -> Self {
        let seed = global_seed ^ stream.wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform `f32` in `[lo, hi]`; returns `lo` when the range is empty or
    /// inverted instead of panicking.
    #[inline]
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo { self.0.gen_range(lo..=hi) } else { lo }
    }
}


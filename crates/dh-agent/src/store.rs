//! Agent storage: `AgentStore` (leader + ducks), `EnemyStore`, and the
//! per-agent RNGs.
//!
//! # Why separate RNGs?
//!
//! The FSM update needs `&mut AgentRng` for the agent being ticked while the
//! world holds `&AgentStore` to read everyone's position.  Keeping the RNGs in
//! their own struct lets both borrows coexist:
//!
//! ```ignore
//! let store: &AgentStore = &world.store;
//! for duck in store.duck_ids() {
//!     let rng = world.rngs.duck_mut(duck);
//!     world.ducks[duck.index()].tick(dt, &sensors, rng);
//! }
//! ```

use dh_core::{AgentId, AgentRng, DhError, DhResult, EnemyId, Facing, Vec2};

/// The chain root is always the first agent slot.
pub const LEADER: AgentId = AgentId(0);

// ── AgentKind ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    Leader,
    Duck,
}

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, separated from the stores so an FSM can
/// draw random numbers while the world is borrowed immutably.
///
/// The leader gets a slot too so `AgentId` indexes directly; it is never
/// drawn from.
pub struct AgentRngs {
    pub ducks:   Vec<AgentRng>,
    pub enemies: Vec<AgentRng>,
}

impl AgentRngs {
    pub(crate) fn new(agent_count: usize, enemy_count: usize, global_seed: u64) -> Self {
        let ducks = (0..agent_count as u32)
            .map(|i| AgentRng::new(global_seed, AgentId(i)))
            .collect();
        let enemies = (0..enemy_count as u32)
            .map(|i| AgentRng::for_enemy(global_seed, EnemyId(i)))
            .collect();
        Self { ducks, enemies }
    }

    #[inline]
    pub fn duck_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.ducks[agent.index()]
    }

    #[inline]
    pub fn enemy_mut(&mut self, enemy: EnemyId) -> &mut AgentRng {
        &mut self.enemies[enemy.index()]
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for the leader and every duck.
///
/// Every `Vec` field has exactly `count` elements and the `AgentId` value
/// indexes all of them:
///
/// ```ignore
/// let pos = store.position[duck.index()];
/// ```
pub struct AgentStore {
    /// Number of agents, leader included.
    pub count: usize,

    pub kind:     Vec<AgentKind>,
    /// Last position reported by the physics layer.
    pub position: Vec<Vec2>,
    /// Where the agent was placed at level start.  Out-of-bounds ducks return
    /// here.
    pub spawn:    Vec<Vec2>,
    pub facing:   Vec<Facing>,

    /// Simulated this frame.  Cleared by the culler and by delivery.
    pub active:    Vec<bool>,
    /// Delivered at the exit; never reactivated.
    pub collected: Vec<bool>,
}

impl AgentStore {
    pub(crate) fn new(spawns: &[Vec2]) -> Self {
        let count = spawns.len();
        let mut kind = vec![AgentKind::Duck; count];
        if let Some(first) = kind.first_mut() {
            *first = AgentKind::Leader;
        }
        Self {
            count,
            kind,
            position:  spawns.to_vec(),
            spawn:     spawns.to_vec(),
            facing:    vec![Facing::default(); count],
            active:    vec![true; count],
            collected: vec![false; count],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of ducks (every agent except the leader).
    #[inline]
    pub fn duck_count(&self) -> usize {
        self.count.saturating_sub(1)
    }

    /// All `AgentId`s in ascending order, leader first.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Duck ids in ascending order.
    pub fn duck_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (1..self.count as u32).map(AgentId)
    }

    #[inline]
    pub fn contains(&self, agent: AgentId) -> bool {
        agent.index() < self.count
    }

    pub fn check(&self, agent: AgentId) -> DhResult<()> {
        if self.contains(agent) { Ok(()) } else { Err(DhError::AgentNotFound(agent)) }
    }

    #[inline]
    pub fn leader_position(&self) -> Vec2 {
        self.position.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Ducks still in play: active and not yet collected.
    pub fn live_ducks(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.duck_ids()
            .filter(|a| self.active[a.index()] && !self.collected[a.index()])
    }

    /// Mark a duck delivered.  It stays in the arrays so ids remain stable.
    pub fn collect(&mut self, agent: AgentId) -> DhResult<()> {
        self.check(agent)?;
        self.collected[agent.index()] = true;
        self.active[agent.index()] = false;
        Ok(())
    }

    pub fn collected_count(&self) -> usize {
        self.collected.iter().filter(|&&c| c).count()
    }
}

// ── EnemyStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for enemies, indexed by `EnemyId`.
pub struct EnemyStore {
    pub count: usize,

    pub position: Vec<Vec2>,
    pub spawn:    Vec<Vec2>,
    pub facing:   Vec<Facing>,
    pub active:   Vec<bool>,
}

impl EnemyStore {
    pub(crate) fn new(spawns: &[Vec2]) -> Self {
        let count = spawns.len();
        Self {
            count,
            position: spawns.to_vec(),
            spawn:    spawns.to_vec(),
            facing:   vec![Facing::default(); count],
            active:   vec![true; count],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn enemy_ids(&self) -> impl Iterator<Item = EnemyId> + '_ {
        (0..self.count as u32).map(EnemyId)
    }

    #[inline]
    pub fn contains(&self, enemy: EnemyId) -> bool {
        enemy.index() < self.count
    }

    pub fn check(&self, enemy: EnemyId) -> DhResult<()> {
        if self.contains(enemy) { Ok(()) } else { Err(DhError::EnemyNotFound(enemy)) }
    }
}

//! Fluent builder for `AgentStore` + `EnemyStore` + `AgentRngs`.
//!
//! # Usage
//!
//! ```rust
//! use dh_agent::{AgentStoreBuilder, LEADER};
//! use dh_core::Vec2;
//!
//! let (store, enemies, rngs) = AgentStoreBuilder::new(/*seed=*/ 42)
//!     .leader(Vec2::new(0.0, 0.0))
//!     .duck(Vec2::new(3.0, 0.0))
//!     .duck(Vec2::new(6.0, 0.0))
//!     .enemy(Vec2::new(12.0, 0.0))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.count, 3);
//! assert_eq!(store.duck_count(), 2);
//! assert_eq!(enemies.count, 1);
//! assert_eq!(rngs.ducks.len(), 3);
//! assert_eq!(store.position[LEADER.index()], Vec2::ZERO);
//! ```

use dh_core::{DhError, DhResult, Vec2};

use crate::{AgentRngs, AgentStore, EnemyStore};

/// Fluent builder collecting spawn points.
///
/// The leader must be set exactly once; ducks and enemies take ids in the
/// order they are added.
pub struct AgentStoreBuilder {
    seed:    u64,
    leader:  Option<Vec2>,
    ducks:   Vec<Vec2>,
    enemies: Vec<Vec2>,
}

impl AgentStoreBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed, leader: None, ducks: Vec::new(), enemies: Vec::new() }
    }

    /// Leader spawn point.  A second call overwrites the first.
    pub fn leader(mut self, at: Vec2) -> Self {
        self.leader = Some(at);
        self
    }

    pub fn duck(mut self, at: Vec2) -> Self {
        self.ducks.push(at);
        self
    }

    pub fn enemy(mut self, at: Vec2) -> Self {
        self.enemies.push(at);
        self
    }

    pub fn ducks(mut self, at: impl IntoIterator<Item = Vec2>) -> Self {
        self.ducks.extend(at);
        self
    }

    pub fn enemies(mut self, at: impl IntoIterator<Item = Vec2>) -> Self {
        self.enemies.extend(at);
        self
    }

    /// Construct the stores.
    ///
    /// Fails with `DhError::Config` when no leader was given or a spawn point
    /// is not finite.
    pub fn build(self) -> DhResult<(AgentStore, EnemyStore, AgentRngs)> {
        let leader = self
            .leader
            .ok_or_else(|| DhError::Config("level has no leader spawn".into()))?;

        let mut agents = Vec::with_capacity(self.ducks.len() + 1);
        agents.push(leader);
        agents.extend_from_slice(&self.ducks);

        if let Some(bad) = agents.iter().chain(&self.enemies).find(|p| !p.is_finite()) {
            return Err(DhError::Config(format!("non-finite spawn point {bad}")));
        }

        let store = AgentStore::new(&agents);
        let enemies = EnemyStore::new(&self.enemies);
        let rngs = AgentRngs::new(store.count, enemies.count, self.seed);
        Ok((store, enemies, rngs))
    }
}

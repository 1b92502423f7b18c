//! Fluent builder for constructing a [`World`].

use dh_agent::{AgentRngs, AgentStore, EnemyStore};
use dh_behavior::{DuckFsm, DuckTuning, EnemyFsm, EnemyTuning};
use dh_chain::FollowerChain;
use dh_core::{AgentId, SimClock, SimConfig};
use dh_cull::{CullConfig, CullKey, VisibilityCuller};

use crate::{ExitGate, SimError, SimResult, World};

/// Fluent builder for [`World`].
///
/// # Required inputs
///
/// - [`SimConfig`]
/// - [`AgentStore`], [`EnemyStore`], [`AgentRngs`] from
///   [`dh_agent::AgentStoreBuilder`]
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                   |
/// |------------------------|-------------------------------------------|
/// | `.duck_tuning(t)`      | `DuckTuning::default()` for every duck    |
/// | `.duck_tunings(v)`     | per-duck tuning, length `duck_count`      |
/// | `.enemy_tuning(t)`     | `EnemyTuning::default()` for every enemy  |
/// | `.enemy_tunings(v)`    | per-enemy tuning, length `enemy count`    |
/// | `.culling(c)`          | `CullConfig::default()`, starts with the first camera |
/// | `.without_culling()`   | culling on                                |
/// | `.goal(n)`             | ducks − 1                                 |
///
/// # Example
///
/// ```rust,ignore
/// let (agents, enemies, rngs) = AgentStoreBuilder::new(seed).leader(p).ducks(ds).build()?;
/// let mut world = WorldBuilder::new(config, agents, enemies, rngs).build()?;
/// let report = world.tick(dt, &frame, &mut NoopObserver)?;
/// ```
pub struct WorldBuilder {
    config:        SimConfig,
    agents:        AgentStore,
    enemies:       EnemyStore,
    rngs:          AgentRngs,
    duck_tuning:   DuckTuning,
    duck_tunings:  Option<Vec<DuckTuning>>,
    enemy_tuning:  EnemyTuning,
    enemy_tunings: Option<Vec<EnemyTuning>>,
    culling:       Option<CullConfig>,
    goal:          Option<u32>,
}

impl WorldBuilder {
    pub fn new(config: SimConfig, agents: AgentStore, enemies: EnemyStore, rngs: AgentRngs) -> Self {
        Self {
            config,
            agents,
            enemies,
            rngs,
            duck_tuning:   DuckTuning::default(),
            duck_tunings:  None,
            enemy_tuning:  EnemyTuning::default(),
            enemy_tunings: None,
            culling:       Some(CullConfig::default()),
            goal:          None,
        }
    }

    /// Shared tuning for every duck.  Also sets the catch geometry used when
    /// contacts are derived from positions.
    pub fn duck_tuning(mut self, tuning: DuckTuning) -> Self {
        self.duck_tuning = tuning;
        self
    }

    /// Per-duck tuning in `AgentId` order, leader excluded.
    pub fn duck_tunings(mut self, tunings: Vec<DuckTuning>) -> Self {
        self.duck_tunings = Some(tunings);
        self
    }

    pub fn enemy_tuning(mut self, tuning: EnemyTuning) -> Self {
        self.enemy_tuning = tuning;
        self
    }

    pub fn enemy_tunings(mut self, tunings: Vec<EnemyTuning>) -> Self {
        self.enemy_tunings = Some(tunings);
        self
    }

    /// Cull with `config` once the first camera arrives.
    pub fn culling(mut self, config: CullConfig) -> Self {
        self.culling = Some(config);
        self
    }

    /// Keep every agent simulated.  The culler can still be started by hand.
    pub fn without_culling(mut self) -> Self {
        self.culling = None;
        self
    }

    pub fn goal(mut self, goal: u32) -> Self {
        self.goal = Some(goal);
        self
    }

    /// Validate inputs, register every duck with the chain and culler, and
    /// return a ready-to-tick [`World`].
    pub fn build(mut self) -> SimResult<World> {
        self.config.validate()?;
        if self.agents.is_empty() {
            return Err(SimError::Config("world needs a leader".into()));
        }
        let duck_count = self.agents.duck_count();
        let enemy_count = self.enemies.count;

        check_len("duck rngs", self.agents.count, self.rngs.ducks.len())?;
        check_len("enemy rngs", enemy_count, self.rngs.enemies.len())?;

        let duck_tunings = match self.duck_tunings {
            Some(v) => {
                check_len("duck tunings", duck_count, v.len())?;
                v
            }
            None => vec![self.duck_tuning.clone(); duck_count],
        };
        let enemy_tunings = match self.enemy_tunings {
            Some(v) => {
                check_len("enemy tunings", enemy_count, v.len())?;
                v
            }
            None => vec![self.enemy_tuning.clone(); enemy_count],
        };
        self.duck_tuning.validate()?;
        for t in &duck_tunings {
            t.validate()?;
        }
        for t in &enemy_tunings {
            t.validate()?;
        }

        // ── Chain and FSMs ────────────────────────────────────────────────
        let mut chain = FollowerChain::new(AgentId(0));
        let mut ducks = Vec::with_capacity(duck_count);
        for (slot, tuning) in duck_tunings.into_iter().enumerate() {
            let id = AgentId(slot as u32 + 1);
            chain.register(id);
            let spawn = self.agents.spawn[id.index()];
            ducks.push(DuckFsm::new(tuning, spawn, self.rngs.duck_mut(id)));
        }
        let enemy_fsms: Vec<EnemyFsm> = enemy_tunings.into_iter().map(EnemyFsm::new).collect();

        // ── Culler ────────────────────────────────────────────────────────
        let auto_cull = self.culling.is_some();
        let cull_config = self.culling.unwrap_or_default();
        if auto_cull && !(cull_config.interval > 0.0) {
            return Err(dh_cull::CullError::BadInterval(cull_config.interval).into());
        }
        let mut culler = VisibilityCuller::new(cull_config)?;
        culler.track_all(self.agents.duck_ids().map(CullKey::Duck));
        culler.track_all(self.enemies.enemy_ids().map(CullKey::Enemy));

        let mut exit = ExitGate::new(duck_count);
        if let Some(goal) = self.goal {
            exit.set_goal(goal);
        }

        log::debug!("world built: {duck_count} ducks, {enemy_count} enemies");
        Ok(World {
            clock: SimClock::new(),
            config: self.config,
            agents: self.agents,
            enemies: self.enemies,
            rngs: self.rngs,
            exit,
            chain,
            ducks,
            enemy_fsms,
            culler,
            auto_cull,
            catch_tuning: self.duck_tuning,
        })
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> SimResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(SimError::AgentCountMismatch { expected, got, what })
    }
}

//! What the caller hands the world each tick, and what it gets back.

use dh_behavior::{DuckIntent, DuckSensors, EnemyIntent, EnemySensors};
use dh_core::{AgentId, EnemyId, Facing, Vec2};
use dh_cull::{CameraView, CullPass};
use rustc_hash::FxHashMap;

// ── SensorFrame ───────────────────────────────────────────────────────────────

/// Per-tick facts computed by the physics layer.
///
/// Ducks or enemies missing from the maps are skipped for the tick.  Fields
/// the world derives itself (a duck's `follow` target, and its `catch`
/// contact when `derive_catches` is set) may be left empty.
#[derive(Clone, Debug, Default)]
pub struct SensorFrame {
    pub leader_position: Vec2,
    pub leader_facing:   Facing,
    /// The leader (or one of its ducks) is touching the exit this tick.
    pub at_exit:         bool,

    pub ducks:   FxHashMap<AgentId, DuckSensors>,
    pub enemies: FxHashMap<EnemyId, EnemySensors>,

    /// Camera for this tick's culling pass, if it moved or was just set.
    pub camera: Option<CameraView>,

    /// Compute catch contacts from positions instead of trusting
    /// `DuckSensors::catch`.
    pub derive_catches: bool,
}

impl SensorFrame {
    pub fn new(leader_position: Vec2, leader_facing: Facing) -> Self {
        Self { leader_position, leader_facing, ..Self::default() }
    }

    pub fn duck(mut self, id: AgentId, sensors: DuckSensors) -> Self {
        self.ducks.insert(id, sensors);
        self
    }

    pub fn enemy(mut self, id: EnemyId, sensors: EnemySensors) -> Self {
        self.enemies.insert(id, sensors);
        self
    }

    pub fn camera(mut self, camera: CameraView) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn at_exit(mut self, at_exit: bool) -> Self {
        self.at_exit = at_exit;
        self
    }

    pub fn derive_catches(mut self) -> Self {
        self.derive_catches = true;
        self
    }
}

// ── TickReport ────────────────────────────────────────────────────────────────

/// Everything the caller must act on after a tick.
///
/// Chain intents have already been applied and are not repeated here; the
/// remaining intents (movement, facing, impulses, returns) are forwarded in
/// ascending id order.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub duck_intents:  Vec<(AgentId, DuckIntent)>,
    pub enemy_intents: Vec<(EnemyId, EnemyIntent)>,
    /// Ducks delivered at the exit this tick.
    pub delivered:     Vec<AgentId>,
    /// Culling pass, if one ran.
    pub cull:          Option<CullPass>,
}

impl TickReport {
    #[inline]
    pub fn intent_count(&self) -> usize {
        self.duck_intents.len() + self.enemy_intents.len()
    }

    pub fn intents_for(&self, duck: AgentId) -> impl Iterator<Item = &DuckIntent> + '_ {
        self.duck_intents.iter().filter(move |(a, _)| *a == duck).map(|(_, i)| i)
    }

    pub fn enemy_intents_for(&self, enemy: EnemyId) -> impl Iterator<Item = &EnemyIntent> + '_ {
        self.enemy_intents.iter().filter(move |(e, _)| *e == enemy).map(|(_, i)| i)
    }
}

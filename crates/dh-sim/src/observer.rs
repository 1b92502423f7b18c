//! World observer trait, plus a recorder for tests and replays.

use std::io::Write;

use dh_core::{AgentId, EnemyId, Tick, Vec2};

use crate::SimResult;

/// Why a duck left the chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetachCause {
    /// An enemy hit the leader or a follower and knocked the tail off.
    EnemyHit(EnemyId),
    /// The duck fell out of the level and is being carried back.
    OutOfBounds,
    /// Removed through [`World::release_duck`](crate::World::release_duck).
    Released,
    /// Found outside the chain while still following: the links were edited
    /// through [`World::chain_mut`](crate::World::chain_mut) or cut by a
    /// chain repair.
    Unlinked,
}

/// Callbacks invoked by [`World::tick`][crate::World::tick].
///
/// All methods have default no-op implementations, so implementors only
/// override what they care about.  Hooks fire during the apply phase, after
/// the chain has already changed.
pub trait SimObserver {
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// `intents` is the number of intents forwarded to the caller this tick.
    fn on_tick_end(&mut self, _tick: Tick, _intents: usize) {}

    /// `duck` now follows `parent`.
    fn on_duck_attached(&mut self, _duck: AgentId, _parent: AgentId) {}

    fn on_duck_detached(&mut self, _duck: AgentId, _cause: DetachCause) {}

    /// An enemy spotted the leader and switched to chasing.
    fn on_enemy_alerted(&mut self, _enemy: EnemyId) {}

    fn on_enemy_jump(&mut self, _enemy: EnemyId, _impulse: Vec2) {}

    /// Ducks handed in at the exit, in detach order, and the score after.
    fn on_ducks_delivered(&mut self, _ducks: &[AgentId], _score: u32) {}

    /// Fired once, on the delivery that reaches the goal.
    fn on_level_complete(&mut self, _score: u32, _goal: u32) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

// ── EventLog ──────────────────────────────────────────────────────────────────

/// One recorded observer callback.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimEvent {
    Attached { duck: AgentId, parent: AgentId },
    Detached { duck: AgentId, cause: DetachCause },
    Alerted { enemy: EnemyId },
    EnemyJump { enemy: EnemyId, impulse: Vec2 },
    Delivered { ducks: Vec<AgentId>, score: u32 },
    LevelComplete { score: u32, goal: u32 },
}

impl SimEvent {
    fn kind(&self) -> &'static str {
        match self {
            SimEvent::Attached { .. } => "attached",
            SimEvent::Detached { .. } => "detached",
            SimEvent::Alerted { .. } => "alerted",
            SimEvent::EnemyJump { .. } => "enemy_jump",
            SimEvent::Delivered { .. } => "delivered",
            SimEvent::LevelComplete { .. } => "level_complete",
        }
    }

    fn detail(&self) -> String {
        match self {
            SimEvent::Attached { duck, parent } => format!("{duck} behind {parent}"),
            SimEvent::Detached { duck, cause } => format!("{duck} {cause:?}"),
            SimEvent::Alerted { enemy } => enemy.to_string(),
            SimEvent::EnemyJump { enemy, impulse } => {
                format!("{enemy} ({:.3}, {:.3})", impulse.x, impulse.y)
            }
            SimEvent::Delivered { ducks, score } => format!("{} ducks, score {score}", ducks.len()),
            SimEvent::LevelComplete { score, goal } => format!("score {score} of {goal}"),
        }
    }
}

/// Records every callback with the tick it happened on.
#[derive(Debug, Default)]
pub struct EventLog {
    tick:       Tick,
    pub events: Vec<(Tick, SimEvent)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events without their ticks, in order.
    pub fn kinds(&self) -> impl Iterator<Item = &SimEvent> + '_ {
        self.events.iter().map(|(_, e)| e)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Dump as `tick,event,detail` rows.
    pub fn write_csv<W: Write>(&self, out: W) -> SimResult<()> {
        let mut w = csv::Writer::from_writer(out);
        w.write_record(["tick", "event", "detail"])?;
        for (tick, event) in &self.events {
            w.write_record(&[tick.0.to_string(), event.kind().to_string(), event.detail()])?;
        }
        w.flush()?;
        Ok(())
    }

    fn push(&mut self, event: SimEvent) {
        self.events.push((self.tick, event));
    }
}

impl SimObserver for EventLog {
    fn on_tick_start(&mut self, tick: Tick) {
        self.tick = tick;
    }

    fn on_duck_attached(&mut self, duck: AgentId, parent: AgentId) {
        self.push(SimEvent::Attached { duck, parent });
    }

    fn on_duck_detached(&mut self, duck: AgentId, cause: DetachCause) {
        self.push(SimEvent::Detached { duck, cause });
    }

    fn on_enemy_alerted(&mut self, enemy: EnemyId) {
        self.push(SimEvent::Alerted { enemy });
    }

    fn on_enemy_jump(&mut self, enemy: EnemyId, impulse: Vec2) {
        self.push(SimEvent::EnemyJump { enemy, impulse });
    }

    fn on_ducks_delivered(&mut self, ducks: &[AgentId], score: u32) {
        self.push(SimEvent::Delivered { ducks: ducks.to_vec(), score });
    }

    fn on_level_complete(&mut self, score: u32, goal: u32) {
        self.push(SimEvent::LevelComplete { score, goal });
    }
}

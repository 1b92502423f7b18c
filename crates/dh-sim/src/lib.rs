//! `dh-sim` — the per-tick world driver for the duck_herd gameplay core.
//!
//! # Tick
//!
//! ```text
//! World::tick(dt, &frame, &mut observer):
//!   ① Ingest   — reported positions → AgentStore / EnemyStore
//!   ② Intents  — DuckFsm::tick, then EnemyFsm::tick, ascending id order
//!   ③ Apply    — AttachToLeader / AttachToTail → FollowerChain::attach_*
//!                LeaveChain                    → FollowerChain::detach_agent
//!                StripTail                     → FollowerChain::detach_tail
//!                everything else               → TickReport
//!   ④ Exit     — leader at exit → detach_all, deliver, score
//!   ⑤ Culling  — VisibilityCuller::tick on its own interval
//! ```
//!
//! The world never moves anything.  Movement intents go back to the caller,
//! who applies them to its physics and reports the results in the next
//! [`SensorFrame`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dh_core::SimConfig;
//! use dh_sim::{load_level, NoopObserver, SensorFrame, WorldBuilder};
//!
//! let level = load_level(path)?;
//! let (agents, enemies, rngs) = level.store_builder(42).build()?;
//! let mut world = WorldBuilder::new(SimConfig::default(), agents, enemies, rngs).build()?;
//! let report = world.tick(0.02, &SensorFrame::new(level.leader, Facing::Right), &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod exit;
pub mod frame;
pub mod level;
pub mod observer;
pub mod world;

#[cfg(test)]
mod tests;

pub use builder::WorldBuilder;
pub use error::{SimError, SimResult};
pub use exit::ExitGate;
pub use frame::{SensorFrame, TickReport};
pub use level::{load_level, load_level_reader, Level, SpawnKind};
pub use observer::{DetachCause, EventLog, NoopObserver, SimEvent, SimObserver};
pub use world::World;

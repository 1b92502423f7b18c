//! `dh-behavior` — creature state machines.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                         |
//! |------------|------------------------------------------------------------------|
//! | [`sensor`] | `DuckSensors`, `EnemySensors` — per-tick facts from the caller   |
//! | [`intent`] | `DuckIntent`, `EnemyIntent` — what each FSM asks for             |
//! | [`tuning`] | `DuckTuning`, `EnemyTuning` with defaults and validation         |
//! | [`motion`] | smooth-damp follow, jump and knockback vectors                   |
//! | [`model`]  | `Creature` trait shared by both FSMs                             |
//! | [`duck`]   | `DuckFsm`, `DuckState`                                           |
//! | [`enemy`]  | `EnemyFsm`, `EnemyState`                                         |
//! | [`error`]  | `BehaviorError`, `BehaviorResult<T>`                             |
//!
//! # Design notes
//!
//! Both FSMs follow the same two-phase pattern as the world tick:
//!
//! 1. **Intent phase**: `tick(dt, &sensors, rng)` reads the sensor snapshot,
//!    advances its own timers, and returns a `Vec` of intents.  It never
//!    touches the chain or any other agent.
//!
//! 2. **Apply phase**: the world consumes the intents in agent-id order,
//!    mutating the chain and forwarding motion requests to the physics layer.
//!
//! Waits that span frames ("until landed", "for 2.5 s") are explicit state
//! variants carrying their own elapsed-time fields.

pub mod duck;
pub mod enemy;
pub mod error;
pub mod intent;
pub mod model;
pub mod motion;
pub mod sensor;
pub mod tuning;


pub use duck::{DuckFsm, DuckState};
pub use enemy::{EnemyFsm, EnemyState, JumpPhase, PatrolPhase};
pub use error::{BehaviorError, BehaviorResult};
pub use intent::{DuckIntent, EnemyIntent};
pub use model::Creature;
pub use sensor::{CatchContact, DuckSensors, EnemySensors, FollowTarget, ObstacleProbe};
pub use tuning::{DuckTuning, EnemyTuning};

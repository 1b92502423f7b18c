//! `dh-core` — foundational types for the `duck_herd` gameplay core.
//!
//! This crate is a dependency of every other `dh-*` crate.  It has no `dh-*`
//! dependencies and few external ones (`glam`, `rand`, `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `AgentId` (leader + ducks), `EnemyId`                 |
//! | [`geo`]     | `Vec2` re-export, `Rect`, `Facing`                    |
//! | [`time`]    | `Tick`, `SimClock`, `SimConfig`, `Countdown`          |
//! | [`rng`]     | `AgentRng`, one seeded stream per duck or enemy       |
//! | [`error`]   | `DhError`, `DhResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DhError, DhResult};
pub use geo::{Facing, Rect, Vec2};
pub use ids::{AgentId, EnemyId};
pub use rng::AgentRng;
pub use time::{Countdown, SimClock, SimConfig, Tick, TIMER_EPSILON};

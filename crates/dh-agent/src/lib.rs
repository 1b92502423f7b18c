//! `dh-agent` — Structure-of-Arrays storage for everything that moves.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`store`]     | `AgentStore` (leader + ducks), `EnemyStore`, `AgentRngs`   |
//! | [`builder`]   | `AgentStoreBuilder` (fluent construction from spawn points)|
//!
//! The leader is always `AgentId(0)`; ducks follow in spawn order.  Enemies
//! live in their own `EnemyStore` indexed by `EnemyId`.
//!
//! The stores mirror what the physics layer reports.  They never integrate
//! motion themselves; `dh-sim` writes sensed positions in at the top of each
//! tick and reads them back for culling and proximity queries.

pub mod builder;
pub mod store;


pub use builder::AgentStoreBuilder;
pub use store::{AgentKind, AgentRngs, AgentStore, EnemyStore, LEADER};

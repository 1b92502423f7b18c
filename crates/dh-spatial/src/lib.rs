//! `dh-spatial` — proximity queries over agent positions.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`index`]   | `ProximityIndex` (R-tree over catch points), `CatchHit`     |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! Callers that run their own overlap tests don't need this crate; the world
//! uses it to derive catch contacts when the sensor frame asks for it.

pub mod error;
pub mod index;


pub use error::{SpatialError, SpatialResult};
pub use index::{CatchHit, ProximityIndex};

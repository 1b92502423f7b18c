//! `dh-cull` — decides which ducks and enemies are simulated.
//!
//! Every `interval` seconds the culler rebuilds the camera rectangle, pads it
//! by `viewport_offset`, and asks each tracked agent whether it is inside.
//! Agents that left the view are switched off only when their behavior says
//! it is safe; agents that came back into view are switched on
//! unconditionally.
//!
//! | Module       | Contents                                          |
//! |--------------|---------------------------------------------------|
//! | [`viewport`] | `CameraView` → padded `Rect`                      |
//! | [`culler`]   | `CullConfig`, `CullKey`, `CullTarget`, `VisibilityCuller` |
//! | [`error`]    | `CullError`, `CullResult<T>`                      |

pub mod culler;
pub mod error;
pub mod viewport;

#[cfg(test)]
mod tests;

pub use culler::{CullConfig, CullKey, CullPass, CullTarget, VisibilityCuller};
pub use error::{CullError, CullResult};
pub use viewport::CameraView;

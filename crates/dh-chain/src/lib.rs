//! `dh-chain` — the leader → duck → duck … follower chain.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`link`]   | `Role`, `Link` — one arena slot's adjacency                  |
//! | [`chain`]  | `FollowerChain` — attach / detach / drain / queries          |
//! | [`verify`] | invariant walk (`verify`) and release-mode repair (`heal`)   |
//! | [`error`]  | `ChainError`, `TransitionFault`, `ChainResult<T>`            |
//!
//! # Model
//!
//! Agents live in an arena indexed by `AgentId`.  "Parent" and "child" are
//! plain id lookups, never ownership, so the leader ↔ duck ↔ duck back-links
//! can't form a reference cycle in the Rust sense even while the chain is
//! being rewired.
//!
//! ```text
//! Leader ──child──▶ A ──child──▶ B ──child──▶ C      tail = C
//!        ◀─parent──   ◀─parent──   ◀─parent──
//! ```
//!
//! Every mutation re-checks the adjacency invariants.  Debug builds panic on
//! a violation; release builds log and [`heal`](FollowerChain::heal).

pub mod chain;
pub mod error;
pub mod link;
pub mod verify;


pub use chain::{ChainIter, FollowerChain, DRAIN_ITERATION_CAP};
pub use error::{ChainError, ChainResult, TransitionFault};
pub use link::{Link, Role};
pub use verify::HealReport;

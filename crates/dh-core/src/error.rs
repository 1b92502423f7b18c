//! Framework error type.
//!
//! Sub-crates define their own error enums (`ChainError`, `CullError`, …) and
//! either convert into `DhError` or wrap it.  Pick whichever keeps the error
//! sites clean.

use thiserror::Error;

use crate::{AgentId, EnemyId};

/// The top-level error type for `dh-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DhError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("enemy {0} not found")]
    EnemyNotFound(EnemyId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `dh-*` crates.
pub type DhResult<T> = Result<T, DhError>;

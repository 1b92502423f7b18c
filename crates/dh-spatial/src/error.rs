//! Spatial-subsystem error type.

use thiserror::Error;

use dh_core::AgentId;

/// Errors produced by `dh-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("agent {0} has a non-finite position")]
    NonFinite(AgentId),

    #[error("catch radius must be positive, got {0}")]
    BadRadius(f32),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

use dh_behavior::BehaviorError;
use dh_chain::ChainError;
use dh_core::DhError;
use dh_cull::CullError;
use dh_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("world configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match {expected} expected")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("culling error: {0}")]
    Cull(#[from] CullError),

    #[error("behavior tuning error: {0}")]
    Behavior(#[from] BehaviorError),

    #[error("proximity error: {0}")]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] DhError),

    #[error("level layout error: {0}")]
    Level(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;

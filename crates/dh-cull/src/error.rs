use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CullError {
    #[error("visibility monitoring needs a camera")]
    NoCamera,

    #[error("check interval must be positive, got {0}")]
    BadInterval(f32),

    #[error("culling configuration error: {0}")]
    Config(String),
}

pub type CullResult<T> = Result<T, CullError>;

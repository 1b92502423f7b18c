use dh_core::AgentId;
use thiserror::Error;

/// Why an attach or detach request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionFault {
    /// The agent already has a parent.
    AlreadyAttached,
    /// The agent is not in the chain.
    NotAttached,
    /// The leader can't follow anything, itself included.
    LeaderCannotFollow,
    /// The caller named a tail that is no longer the tail.
    StaleTail { observed: AgentId, actual: AgentId },
}

impl std::fmt::Display for TransitionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionFault::AlreadyAttached => write!(f, "already attached"),
            TransitionFault::NotAttached => write!(f, "not attached"),
            TransitionFault::LeaderCannotFollow => write!(f, "leader cannot follow"),
            TransitionFault::StaleTail { observed, actual } => {
                write!(f, "stale tail {observed}, current tail is {actual}")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ChainError {
    /// A request that would break the chain shape.  The chain is unchanged;
    /// callers treat this as a no-op.
    #[error("invalid transition for {agent}: {fault}")]
    InvalidTransition {
        agent: AgentId,
        fault: TransitionFault,
    },

    /// Parent/child symmetry, acyclicity, or the cached tail/length is wrong.
    #[error("broken chain invariant: {0}")]
    BrokenInvariant(String),

    /// The id was never registered with the chain.
    #[error("agent {0} is not registered with the chain")]
    MissingReference(AgentId),
}

impl ChainError {
    /// `true` for errors the caller should shrug off as a no-op.
    pub fn is_benign(&self) -> bool {
        matches!(self, ChainError::InvalidTransition { .. })
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

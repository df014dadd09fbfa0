//! Failures that indicate a bug in this crate's own bookkeeping rather than
//! bad input: a state that the code should have made unreachable.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    #[error("unexpected state: {0}")]
    InvalidState(String),

    #[error("not yet implemented: {0}")]
    NotImplemented(String),

    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

//! Local error type for this crate, converting into [`egp_error::Error`] at
//! the boundary.
use egp_error::CoreError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<GraphError> for egp_error::Error {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Core(c) => c.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;

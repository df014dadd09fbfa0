//! Local error type for this crate, converting into [`egp_error::Error`] at
//! the boundary.
use egp_error::CoreError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GcError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Graph(#[from] egp_graph::GraphError),
}

impl From<GcError> for egp_error::Error {
    fn from(e: GcError) -> Self {
        match e {
            GcError::Core(c) => c.into(),
            GcError::Graph(g) => g.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GcError>;

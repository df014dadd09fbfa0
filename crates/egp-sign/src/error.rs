//! Local error type for this crate, converting into [`egp_error::Error`] at
//! the boundary the way `ploke-io`/`ploke-db` convert their own local
//! errors.
use egp_error::{CoreError, FatalError};

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Fatal(#[from] FatalError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed sidecar json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed key material: {0}")]
    KeyMaterial(String),
}

impl From<SignError> for egp_error::Error {
    fn from(e: SignError) -> Self {
        match e {
            SignError::Core(c) => c.into(),
            SignError::Fatal(f) => f.into(),
            SignError::Io(io) => {
                CoreError::InvariantViolation(format!("signature file io error: {io}")).into()
            }
            SignError::Json(j) => {
                CoreError::InvariantViolation(format!("malformed signature sidecar: {j}")).into()
            }
            SignError::KeyMaterial(m) => CoreError::BadAlgorithm(m).into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SignError>;

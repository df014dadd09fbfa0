//! Structured failures specific to the type system, connection graph, and
//! signed content store. These are the everyday, expected-to-be-handled
//! errors of the three domains, as opposed to [`crate::FatalError`]'s
//! abort-now failures or [`crate::WarningError`]'s forward-progress ones.
use std::path::PathBuf;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("signature verification failed for {path}")]
    InvalidSignature { path: PathBuf },

    #[error("content hash mismatch: expected {expected}, computed {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("unsupported signature algorithm: {0}")]
    BadAlgorithm(String),

    #[error("missing required field {field} on {object}")]
    MissingField {
        object: &'static str,
        field: &'static str,
    },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("connection graph has invalid shape: {0}")]
    GraphShape(String),

    #[error("type inconsistency: {0}")]
    TypeInconsistency(String),

    #[error("index {idx} out of range for {row} (len {len})")]
    IndexOutOfRange { row: String, idx: u16, len: u8 },

    #[error("{attr} value {value} out of bounds [{min}, {max}]")]
    OutOfBounds {
        attr: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("cannot {op} a frozen connection graph")]
    FrozenGraph { op: &'static str },
}

impl From<egp_common::ValidationError> for CoreError {
    fn from(e: egp_common::ValidationError) -> Self {
        CoreError::InvariantViolation(e.to_string())
    }
}

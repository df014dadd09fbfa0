//! Non-fatal issues that allow forward progress: the caller is expected to
//! record these and continue rather than abort.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WarningError {
    #[error("duplicate import skipped: {0}")]
    DuplicateImport(String),

    #[error("dropped {count} least-recently-used entries from {cache} to satisfy capacity {capacity}")]
    CacheEviction {
        cache: &'static str,
        count: usize,
        capacity: usize,
    },

    #[error("endpoint {row}[{idx}] left unconnected after stabilisation")]
    UnconnectedEndpoint { row: String, idx: u16 },

    #[error("signature present but verification skipped: {reason}")]
    VerificationSkipped { reason: String },
}

//! Errors that abort the current operation outright: no partial result is
//! meaningful and the caller should stop rather than try to recover.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("xuid space exhausted for type {tt}/io {io}/fx {fx}")]
    UidExhausted { tt: u8, io: u8, fx: u8 },

    #[error("object too large to process: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("type registry lock poisoned: {0}")]
    RegistryPoisoned(String),
}

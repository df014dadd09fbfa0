use super::{Error, Severity};

/// A policy for classifying and emitting errors. Library code in
/// `egp-types`/`egp-graph`/`egp-gc` never logs or prints directly; it returns
/// `Result<T>` and leaves emission to whatever policy the caller installs at
/// the boundary.
pub trait ErrorPolicy: Send + Sync {
    /// Classify the error's severity.
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }

    /// Emit the error according to the policy (log, collect, ignore, ...).
    fn emit(&self, error: &Error);
}

/// A policy that does nothing. Useful in tests and for callers that only
/// care about the `Result` value.
#[derive(Debug, Clone, Default)]
pub struct NoopPolicy;

impl ErrorPolicy for NoopPolicy {
    fn emit(&self, _error: &Error) {}
}

/// Emits via `tracing`, at `WARN` for [`Severity::Warning`] and `ERROR`
/// otherwise.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn emit(&self, error: &Error) {
        use tracing::{event, Level};

        match error.severity() {
            Severity::Warning => event!(Level::WARN, error = %error),
            Severity::Error | Severity::Fatal => event!(Level::ERROR, error = %error),
        }
    }
}

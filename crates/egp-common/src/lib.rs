//! Shared validation helpers and constants used across the erasmus-gp core crates.
//!
//! This mirrors the role of `egpcommon.validator.Validator` and
//! `egpcommon.common` in the Python original: a small set of named checks
//! that every data-holding type in `egp-types` / `egp-graph` / `egp-gc` runs
//! over its fields, returning structured errors instead of asserting.

use std::sync::OnceLock;

pub mod log_levels;

pub use log_levels::{should_check_consistency, should_verify};

/// A validation failure. Downstream crates convert this into their own
/// local error type (and ultimately into `egp_error::Error`) rather than
/// returning it directly, the same way `std::io::Error` is wrapped rather
/// than propagated raw at a crate boundary.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{attr} must be between {min} and {max} but is {value}")]
    OutOfRange {
        attr: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("{attr} must be between {min} and {max} characters but is {len}")]
    BadLength {
        attr: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },
    #[error("{attr} must contain only printable ASCII characters: {value:?}")]
    NotPrintable { attr: &'static str, value: String },
    #[error("{attr} must not be empty")]
    Empty { attr: &'static str },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// The lower bound accepted for any EGP timestamp, mirroring `EGP_EPOCH` in
/// `egpcommon.common`. GeneticCode `created`/`updated` fields
/// must not predate this instant.
pub fn egp_epoch() -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

/// Checks that `value` is within `[min, max]` inclusive.
pub fn in_range(attr: &'static str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            attr,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Checks that `s.len()` (in bytes; all validated strings here are ASCII) is
/// within `[min, max]` inclusive.
pub fn is_length(attr: &'static str, s: &str, min: usize, max: usize) -> ValidationResult<()> {
    let len = s.len();
    if len < min || len > max {
        return Err(ValidationError::BadLength {
            attr,
            len,
            min,
            max,
        });
    }
    Ok(())
}

/// Checks that every character of `s` is printable ASCII (0x20..=0x7E),
/// mirroring `Validator._is_printable_string`'s `^[ -~]+$` regex.
pub fn is_printable_string(attr: &'static str, s: &str) -> ValidationResult<()> {
    if s.is_empty() {
        return Err(ValidationError::Empty { attr });
    }
    if !s.chars().all(|c| (' '..='~').contains(&c)) {
        return Err(ValidationError::NotPrintable {
            attr,
            value: s.to_string(),
        });
    }
    Ok(())
}

/// Combined check used for `TypeDef::name` and `TypeDef::default`: printable
/// ASCII and length in `[min, max]`.
pub fn is_short_printable_string(
    attr: &'static str,
    s: &str,
    min: usize,
    max: usize,
) -> ValidationResult<()> {
    is_length(attr, s, min, max)?;
    is_printable_string(attr, s)
}

/// Environment-variable-gated flag, read once per process. `EGP_VERIFY=1`
/// (or any truthy value) enables expensive-but-not-as-expensive-as-
/// consistency verification paths; unset/`0` disables them. Mirrors
/// `_logger.isEnabledFor(level=VERIFY)` gating in the Python source without
/// requiring a custom `tracing` level.
pub(crate) fn env_flag(name: &str, cell: &'static OnceLock<bool>) -> bool {
    *cell.get_or_init(|| {
        std::env::var(name)
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_accepts_bounds_inclusive() {
        assert!(in_range("x", 0, 0, 10).is_ok());
        assert!(in_range("x", 10, 0, 10).is_ok());
        assert!(in_range("x", 11, 0, 10).is_err());
        assert!(in_range("x", -1, 0, 10).is_err());
    }

    #[test]
    fn printable_string_rejects_control_chars() {
        assert!(is_printable_string("name", "hello").is_ok());
        assert!(is_printable_string("name", "hello\nworld").is_err());
        assert!(is_printable_string("name", "").is_err());
    }

    #[test]
    fn short_printable_string_enforces_length() {
        assert!(is_short_printable_string("name", "ok", 1, 64).is_ok());
        let too_long: String = "x".repeat(65);
        assert!(is_short_printable_string("name", &too_long, 1, 64).is_err());
    }
}

//! `VERIFY` / `CONSISTENCY` log-level gates.
//!
//! The Python source defines two custom logging levels between `DEBUG` and
//! `INFO` (`VERIFY`) and below `DEBUG` (`CONSISTENCY`) used to gate
//! increasingly expensive self-checks. `tracing` has a
//! fixed level set, so this crate exposes the same on/off gating as two
//! plain functions read once from the environment, the way a teacher crate
//! gates an expensive debug-assertions path.

use std::sync::OnceLock;

static VERIFY: OnceLock<bool> = OnceLock::new();
static CONSISTENCY: OnceLock<bool> = OnceLock::new();

/// Whether `verify()`-level structural checks that are too expensive to run
/// unconditionally should run. Cheap invariants are always
/// checked regardless of this flag.
pub fn should_verify() -> bool {
    crate::env_flag("EGP_VERIFY", &VERIFY)
}

/// Whether `consistency()`-level checks (bidirectional ref integrity, hash
/// recomputation) should run. Off by default: these walk the
/// whole graph and are meant for test/debug builds, matching the source's
/// `CONSISTENCY` log level being below `DEBUG`.
pub fn should_check_consistency() -> bool {
    crate::env_flag("EGP_CONSISTENCY", &CONSISTENCY)
}

//! Error kinds for the sieve core's own contract (§7 of the design).
//!
//! Everything *outside* the core (config load/save, output files, the
//! verify/audit tooling) keeps using the teacher's boxed-`dyn Error` alias
//! in [`crate::engine_types::PrimeResult`], since those call sites only need
//! to propagate a message. The core's contract is narrower and needs
//! distinguishable kinds for the exit-code policy in §6, so it gets its own
//! enum.

use std::fmt;

/// The four error kinds the sieve core's contract (§7) can surface. All
/// errors are detected before any sieving work begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// `N` is zero or exceeds the implementation ceiling.
    BadBound(String),
    /// Wheel depth is outside `1..=7`, or the chosen wheel's slot count
    /// exceeds the table's slot count.
    BadWheel(String),
    /// Table allocation failed.
    Alloc(String),
    /// Worker count is less than 1, or another configuration value is invalid.
    Config(String),
}

impl fmt::Display for SieveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SieveError::BadBound(msg) => write!(f, "bad bound: {msg}"),
            SieveError::BadWheel(msg) => write!(f, "bad wheel: {msg}"),
            SieveError::Alloc(msg) => write!(f, "allocation failed: {msg}"),
            SieveError::Config(msg) => write!(f, "bad config: {msg}"),
        }
    }
}

impl std::error::Error for SieveError {}

/// Result alias for the sieve core's own operations.
pub type SieveResult<T> = Result<T, SieveError>;

/// §6: 0 on success, 1 on any core error (bad arguments or allocation failure).
pub fn exit_code(result: &SieveResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

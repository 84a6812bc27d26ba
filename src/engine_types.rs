//! Shared result and progress types for the ambient tooling: verification
//! and the `pi(x)` oracle. These call sites only need to propagate a
//! message, so they use a boxed-`dyn Error` alias rather than
//! [`crate::errors::SieveError`], which is reserved for the sieve core's own
//! narrower contract.

use std::error::Error;

pub type PrimeResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Progress of a long-running scan (verification, mostly), for periodic
/// log lines rather than a UI progress bar.
#[derive(Clone, Copy, Debug)]
pub struct Progress {
    pub processed: u64,
    pub total: u64,
    pub eta_secs: Option<u64>,
}

/// Estimates remaining seconds from progress so far and elapsed time.
/// Returns `None` until some progress has been made.
pub fn compute_eta(processed: u64, total: u64, elapsed_secs: f64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    let progress = processed.min(total) as f64 / total as f64;
    if progress > 0.0 {
        let total_time = elapsed_secs / progress;
        Some(((total_time - elapsed_secs).max(0.0)).round() as u64)
    } else {
        None
    }
}

//! `pi(x)` oracle via the `primecount` crate, used to cross-check a sieve
//! run's total count independently of the sieve core itself.

use crate::engine_types::PrimeResult;

pub const PRIMECOUNT_VERSION: &str = "primecount crate 0.2 (auto algorithm selection)";
pub const PRIMECOUNT_MODE: &str = "pi(x) default (automatic algorithm selection)";

/// True if `x` fits in the signed 64-bit domain `primecount::pi` takes. Lets
/// a caller check before committing to a potentially long-running call.
pub fn fits_primecount_domain(x: u64) -> bool {
    i64::try_from(x).is_ok()
}

fn as_signed(x: u64) -> PrimeResult<i64> {
    i64::try_from(x).map_err(|_| format!("{x} is past primecount's i64 ceiling ({})", i64::MAX).into())
}

/// Computes `pi(x)`, the count of primes `<= x`.
pub fn compute_prime_pi(x: u64) -> PrimeResult<u64> {
    let signed = as_signed(x)?;
    Ok(primecount::pi(signed) as u64)
}

/// Count of primes in the inclusive range `[min, max]`.
pub fn compute_prime_count_in_range(min: u64, max: u64) -> PrimeResult<u64> {
    if min > max {
        return Err(format!("empty range: min ({min}) is greater than max ({max})").into());
    }

    let up_to_max = compute_prime_pi(max)?;
    let below_min = match min.checked_sub(1) {
        Some(cap) => compute_prime_pi(cap)?,
        None => 0,
    };

    // `below_min` can only exceed `up_to_max` if primecount itself
    // disagrees between two calls; clamp rather than underflow.
    Ok(up_to_max - below_min.min(up_to_max))
}

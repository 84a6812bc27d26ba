//! A plain, unoptimized trial-division sieve, kept around as an independent
//! oracle for tests of the wheel-based core — it shares no code with
//! [`crate::sieve`] so it can't share its bugs either.

use crate::engine_types::PrimeResult;

/// Largest integer `r` with `r * r <= n`, via binary search.
pub fn integer_sqrt(n: u64) -> u64 {
    let mut low = 0u64;
    let mut high = n;
    while low <= high {
        let mid = (low + high) >> 1;
        match mid.checked_mul(mid) {
            Some(val) if val == n => return mid,
            Some(val) if val < n => low = mid + 1,
            _ => high = mid - 1,
        }
    }
    high
}

/// Enumerates the primes in `[2, limit]` by flat Eratosthenes sieve.
pub fn simple_sieve(limit: u64) -> PrimeResult<Vec<u64>> {
    if limit < 2 {
        return Ok(Vec::new());
    }

    let size = (limit + 1) as usize;
    let mut is_prime = vec![true; size];
    is_prime[0] = false;
    if limit >= 1 {
        is_prime[1] = false;
    }

    let lim_sqrt = integer_sqrt(limit);
    for i in 2..=lim_sqrt as usize {
        if is_prime[i] {
            let mut j = i * i;
            while j <= limit as usize {
                is_prime[j] = false;
                j += i;
            }
        }
    }

    let mut primes = Vec::new();
    for (i, &flag) in is_prime.iter().enumerate().take(limit as usize + 1).skip(2) {
        if flag {
            primes.push(i as u64);
        }
    }
    Ok(primes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_sqrt_matches_known_values() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(99), 9);
        assert_eq!(integer_sqrt(100), 10);
    }

    #[test]
    fn simple_sieve_matches_known_prime_list() {
        assert_eq!(simple_sieve(30).unwrap(), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }
}

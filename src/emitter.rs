//! Component H: the output emitter.
//!
//! Primes already in [`crate::sieve::SieveContext::primes`] are emitted
//! directly — they were individually discovered by the extractor, so no
//! further table lookup is needed. Everything from the extractor's cursor
//! onward is decoded fresh from the residue table, since those primes were
//! never worth appending to the running list (they're larger than any prime
//! this run ever needed for sieving). The final slot may hold residues past
//! `N`, so every emission is bound-checked.

use crate::residue_table::RESIDUES;
use crate::sieve::SieveContext;
use std::io;

/// Streams every prime `<= N` to `sink`, in ascending order.
pub fn emit_primes(ctx: &SieveContext, mut sink: impl FnMut(u64) -> io::Result<()>) -> io::Result<()> {
    let n = ctx.n;

    for &p in ctx.primes() {
        if p > n {
            return Ok(());
        }
        sink(p)?;
    }

    let table = ctx.table();
    for i in ctx.cursor()..table.len() {
        let nibble = table.get(i) & 0b0000_1111;
        if nibble == 0 {
            continue;
        }
        for (bit, &residue) in RESIDUES.iter().enumerate() {
            if nibble & (1 << bit) != 0 {
                let value = 10 * (i as u64) + residue;
                if value > n {
                    return Ok(());
                }
                sink(value)?;
            }
        }
    }

    Ok(())
}

/// Collects every prime `<= N` into a `Vec`, for tests and small-bound callers.
pub fn collect_primes(ctx: &SieveContext) -> Vec<u64> {
    let mut out = Vec::new();
    emit_primes(ctx, |p| {
        out.push(p);
        Ok(())
    })
    .expect("collecting into a Vec never fails");
    out
}

/// Counts every prime `<= N` without materializing the list.
pub fn count_primes(ctx: &SieveContext) -> u64 {
    let mut count = 0u64;
    emit_primes(ctx, |_| {
        count += 1;
        Ok(())
    })
    .expect("counting never fails");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SieveConfig;

    #[test]
    fn respects_n_not_a_multiple_of_ten() {
        let cfg = SieveConfig { n: 23, wheel_depth: 1, block_size: 32, workers: 1, ..SieveConfig::default() };
        let ctx = crate::sieve::run(&cfg).unwrap();
        let primes = collect_primes(&ctx);
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23]);
        assert!(!primes.contains(&29));
    }

    #[test]
    fn count_matches_collect_len() {
        let cfg = SieveConfig { n: 10_000, wheel_depth: 3, block_size: 256, workers: 2, ..SieveConfig::default() };
        let ctx = crate::sieve::run(&cfg).unwrap();
        assert_eq!(count_primes(&ctx), collect_primes(&ctx).len() as u64);
    }
}

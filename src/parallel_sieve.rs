//! Component G: the parallel block sieve.
//!
//! Partitions the table into disjoint, fixed-size blocks and sieves each
//! block independently on a worker pool — no cross-block state, unlike the
//! serial path's [`crate::block_sieve::ResumeState`]. Each block instead
//! recomputes where a prime's cycle would have put it, from `block_start`
//! alone, via `prev_stop = block_start - (block_start mod prime)`: the
//! largest cycle base at or before this block.
//!
//! Because blocks are disjoint slices handed out by `rayon`'s
//! `par_chunks_mut`, there is no shared mutable state between workers and no
//! `unsafe` is needed — see SPEC_FULL.md's Open Questions for why this
//! replaces the original's raw pthread stride dispatch.

use crate::cycle::{CycleDescriptor, DescriptorCache, GroupDescriptor};
use crate::errors::SieveError;
use crate::residue_table::ResidueTable;
use rayon::prelude::*;

/// Sieves one prime's composites within a single block.
///
/// `block_start` and `stop_slot` are both global slot indices; `stop_slot`
/// is inclusive and equal to `block_start + slice.len() as u64 - 1`.
fn sieve_prime_in_parallel_block(
    slice: &mut [u8],
    block_start: u64,
    stop_slot: u64,
    block_size: u64,
    cycle: &CycleDescriptor,
    group: &GroupDescriptor,
    prime: u64,
) {
    let jumps = cycle.jumps();
    let masks = group.masks();

    // Largest multiple of `prime` at or before `block_start`: the cycle base
    // a serial sieve would have reached by the time it got here.
    let prev_stop = block_start - (block_start % prime);

    let apply = |slice: &mut [u8], global_slot: u64, mask: u8| {
        if global_slot > block_start {
            if let Some(local) = global_slot.checked_sub(block_start) {
                let local = local as usize;
                if local < slice.len() {
                    slice[local] &= mask;
                }
            }
        }
    };

    for k in 0..4 {
        let global_slot = prev_stop + jumps[k];
        if global_slot > block_start && global_slot <= stop_slot {
            apply(slice, global_slot, masks[k]);
        }
    }

    if prime >= block_size {
        return;
    }

    let Some(stop) = stop_slot.checked_sub(prime) else { return };
    let mut base = prev_stop + prime;
    while base <= stop {
        for k in 0..4 {
            apply(slice, base + jumps[k], masks[k]);
        }
        base += prime;
    }

    for k in 0..4 {
        let global_slot = base + jumps[k];
        if global_slot <= stop_slot {
            apply(slice, global_slot, masks[k]);
        } else {
            break;
        }
    }
}

/// Sieves `table[region_start..]` in disjoint blocks of `block_size`,
/// applying every prime in `primes[prime_start_idx..=prime_end_idx_inclusive]`
/// to each block on a worker pool sized to `workers`.
#[allow(clippy::too_many_arguments)]
pub fn sieve_region_parallel(
    table: &mut ResidueTable,
    primes: &[u64],
    descriptors: &DescriptorCache,
    prime_start_idx: usize,
    prime_end_idx_inclusive: usize,
    bootstrap_prime_count: usize,
    region_start: usize,
    block_size: u64,
    workers: usize,
) -> Result<(), SieveError> {
    if workers < 1 {
        return Err(SieveError::Config("worker count must be >= 1".to_string()));
    }
    if block_size < 1 {
        return Err(SieveError::Config("block size must be >= 1".to_string()));
    }
    if region_start >= table.len() {
        return Ok(());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| SieveError::Config(format!("failed to build worker pool: {e}")))?;

    let region = &mut table.as_mut_slice()[region_start..];
    let region_start = region_start as u64;
    let chunk_len = block_size as usize;

    pool.install(|| {
        region
            .par_chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(chunk_idx, chunk)| {
                let block_start = region_start + (chunk_idx as u64) * block_size;
                let stop_slot = block_start + chunk.len() as u64 - 1;
                for prime_idx in prime_start_idx..=prime_end_idx_inclusive {
                    let sieving_idx = prime_idx - bootstrap_prime_count;
                    let prime = primes[prime_idx];
                    let cycle = descriptors.cycle(sieving_idx);
                    let group = descriptors.group(sieving_idx);
                    sieve_prime_in_parallel_block(
                        chunk, block_start, stop_slot, block_size, cycle, group, prime,
                    );
                }
            });
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_sieve::{sieve_prime_in_block, ResumeState};

    /// Sieving a prime block-by-block with fresh, recomputed state each time
    /// must clear exactly the same slots as the serial resume-carrying path,
    /// everywhere past the prime's own position. (Within the prime's own
    /// first cycle, serial deliberately preserves the prime's own bit while
    /// parallel does not bother to — harmless, since by the time sieving
    /// reaches that region in real use the extractor has already moved past
    /// it, so its bit no longer feeds into emission either way.)
    #[test]
    fn parallel_block_matches_serial_resume() {
        for &prime in &[11u64, 13, 101] {
            let cycle = CycleDescriptor::for_prime(prime);
            let group = GroupDescriptor::for_prime(prime);
            let block_size = 40u64;
            let total = 400usize;

            let mut serial = ResidueTable::new(total);
            let mut resume = ResumeState::default();
            let mut stop = block_size - 1;
            loop {
                let actual_stop = stop.min(total as u64 - 1);
                sieve_prime_in_block(&mut serial, &cycle, &group, prime, &mut resume, actual_stop);
                if actual_stop >= total as u64 - 1 {
                    break;
                }
                stop += block_size;
            }

            let mut parallel = ResidueTable::new(total);
            {
                let slice = parallel.as_mut_slice();
                let mut block_start = 0u64;
                for chunk in slice.chunks_mut(block_size as usize) {
                    let stop_slot = block_start + chunk.len() as u64 - 1;
                    sieve_prime_in_parallel_block(
                        chunk, block_start, stop_slot, block_size, &cycle, &group, prime,
                    );
                    block_start += block_size;
                }
            }

            let past_own_position = prime as usize + 1;
            assert_eq!(
                &serial.as_slice()[past_own_position..],
                &parallel.as_slice()[past_own_position..],
                "prime {prime}"
            );
        }
    }
}

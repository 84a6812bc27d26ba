//! Component F: the serial block sieve.
//!
//! Processes the table segment by segment, applying every known sieving
//! prime's composite-removal cycle to each segment in turn. A prime whose
//! full four-jump cycle is longer than one segment needs to resume exactly
//! where it left off the next time it is visited — [`ResumeState`] is that
//! per-prime bookkeeping.

use crate::cycle::{CycleDescriptor, DescriptorCache, GroupDescriptor};
use crate::residue_table::ResidueTable;

/// Per-prime resumption state. `last_slot` is the most recent cycle base
/// (always `0` or a previously-reached multiple of the prime itself, in
/// cycle-step units); `phase` is how many of that cycle's four jumps have
/// already been applied (`0..=3`).
///
/// The initial state `(0, 1)` means "cycle base 0, first jump already
/// applied": that first jump (`j0`) lands on the prime's own slot, which
/// must not be re-cleared, and the prime's square is cleared separately by
/// the extractor before block sieving ever starts.
#[derive(Debug, Clone, Copy)]
pub struct ResumeState {
    pub last_slot: u64,
    pub phase: u8,
}

impl Default for ResumeState {
    fn default() -> Self {
        ResumeState { last_slot: 0, phase: 1 }
    }
}

/// Applies one prime's composite cycle to `table[..=stop_slot]` (inclusive),
/// resuming from `resume` and leaving it updated for the next segment.
pub fn sieve_prime_in_block(
    table: &mut ResidueTable,
    cycle: &CycleDescriptor,
    group: &GroupDescriptor,
    prime: u64,
    resume: &mut ResumeState,
    stop_slot: u64,
) {
    let jumps = cycle.jumps();
    let masks = group.masks();

    let start = resume.last_slot;
    let mut i = start;

    if let Some(stop) = stop_slot.checked_sub(prime) {
        if start <= stop {
            for phase in (resume.phase as usize)..4 {
                apply(table, start, jumps[phase], masks[phase]);
            }
            let mut base = start + prime;
            while base <= stop {
                for phase in 0..4 {
                    apply(table, base, jumps[phase], masks[phase]);
                }
                base += prime;
            }
            i = base;
            resume.last_slot = i;
            resume.phase = 0;
        }
    }

    let mut phase = 0u8;
    for k in 0..4 {
        let target = i + jumps[k];
        if target <= stop_slot {
            apply(table, i, jumps[k], masks[k]);
            phase = k as u8 + 1;
        } else {
            break;
        }
    }
    resume.phase = phase % 4;
    resume.last_slot = i;
}

fn apply(table: &mut ResidueTable, base: u64, jump: u64, mask: u8) {
    let slot = (base + jump) as usize;
    if slot < table.len() {
        table.clear_mask(slot, mask);
    }
}

/// Applies every prime in `primes[prime_start_idx..=prime_end_idx]` to
/// `table[..=stop_slot]`, using and updating each prime's [`ResumeState`].
#[allow(clippy::too_many_arguments)]
pub fn sieve_block_serial(
    table: &mut ResidueTable,
    descriptors: &DescriptorCache,
    resume_states: &mut [ResumeState],
    primes: &[u64],
    prime_start_idx: usize,
    prime_end_idx_inclusive: usize,
    bootstrap_prime_count: usize,
    stop_slot: u64,
) {
    for prime_idx in prime_start_idx..=prime_end_idx_inclusive {
        let sieving_idx = prime_idx - bootstrap_prime_count;
        let prime = primes[prime_idx];
        let cycle = *descriptors.cycle(sieving_idx);
        let group = *descriptors.group(sieving_idx);
        sieve_prime_in_block(table, &cycle, &group, prime, &mut resume_states[sieving_idx], stop_slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::{CycleDescriptor, GroupDescriptor};
    use crate::residue_table::ResidueTable;

    /// Sieving prime 11 across two small, back-to-back segments must clear
    /// exactly the same slots as sieving it in one pass over the whole range.
    #[test]
    fn segmented_sieve_matches_single_pass() {
        let prime = 11u64;
        let cycle = CycleDescriptor::for_prime(prime);
        let group = GroupDescriptor::for_prime(prime);

        let mut whole = ResidueTable::new(200);
        let mut resume_whole = ResumeState::default();
        sieve_prime_in_block(&mut whole, &cycle, &group, prime, &mut resume_whole, 199);

        let mut segmented = ResidueTable::new(200);
        let mut resume_seg = ResumeState::default();
        for stop in [49u64, 99, 149, 199] {
            sieve_prime_in_block(&mut segmented, &cycle, &group, prime, &mut resume_seg, stop);
        }

        assert_eq!(whole.as_slice(), segmented.as_slice());
    }

    #[test]
    fn prime_square_is_cleared_by_the_first_cycle() {
        let prime = 11u64;
        let cycle = CycleDescriptor::for_prime(prime);
        let group = GroupDescriptor::for_prime(prime);
        let mut table = ResidueTable::new(50);
        // Mirrors the extractor's pre-clear of 121 (slot 12, residue 1).
        table.clear_residue(12, 1);
        let mut resume = ResumeState::default();
        sieve_prime_in_block(&mut table, &cycle, &group, prime, &mut resume, 49);
        assert_eq!(table.get(12) & 0b0000_0001, 0);
    }
}

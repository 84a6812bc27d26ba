//! Component E: the prime extractor.
//!
//! Walks the residue table forward from a persistent cursor, decoding each
//! settled slot's low nibble into up to four newly-discovered primes. Every
//! emitted prime is appended to the running prime list and gets a
//! [`crate::cycle::CycleDescriptor`]/[`crate::cycle::GroupDescriptor`] pair
//! cached for later sieving.

use crate::cycle::DescriptorCache;
use crate::residue_table::{ResidueTable, RESIDUES};

/// Pre-clears the slot containing `prime * prime`, then walks the table from
/// `*cursor` up through that slot (inclusive), emitting every prime found.
///
/// The pre-clear matters because extraction walks up to and including the
/// slot holding `prime²`, and `prime²` is the one composite in that range no
/// smaller prime has removed yet. Without clearing it first, the walk would
/// misread it as a new prime.
///
/// If `stop_at_prime` is set, the walk finishes the slot it is on and
/// returns as soon as it emits a prime `>=` that threshold — this lets the
/// warm-up driver in [`crate::sieve`] stop extracting once it has reached
/// `floor(sqrt(10 * M))` and no further sieving primes are needed.
///
/// Returns the largest prime emitted during this call, if any.
pub fn extract_more(
    table: &mut ResidueTable,
    primes: &mut Vec<u64>,
    descriptors: &mut DescriptorCache,
    cursor: &mut usize,
    anchor_prime: u64,
    stop_at_prime: Option<u64>,
) -> Option<u64> {
    let square = anchor_prime * anchor_prime;
    let square_slot = (square / 10) as usize;
    if square_slot < table.len() {
        table.clear_residue(square_slot, square % 10);
    }

    let last_slot = square_slot.min(table.len().saturating_sub(1));
    let mut largest_emitted = None;
    let mut i = *cursor;

    while i <= last_slot && i < table.len() {
        let nibble = table.get(i) & 0b0000_1111;
        if nibble != 0 {
            for (bit, &residue) in RESIDUES.iter().enumerate() {
                if nibble & (1 << bit) != 0 {
                    let value = 10 * (i as u64) + residue;
                    primes.push(value);
                    descriptors.push(value);
                    largest_emitted = Some(value);
                }
            }
        }
        i += 1;

        if let (Some(threshold), Some(largest)) = (stop_at_prime, largest_emitted) {
            if largest >= threshold {
                break;
            }
        }
    }

    *cursor = i;
    largest_emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap;

    #[test]
    fn extracts_primes_up_through_anchor_square() {
        let mut table = ResidueTable::new(21);
        let mut primes = bootstrap::seed(&mut table);
        table.clear_residue(0, 1);
        let mut descriptors = DescriptorCache::new();
        let mut cursor = 1usize;

        extract_more(&mut table, &mut primes, &mut descriptors, &mut cursor, 7, None);

        // Walks slots 1..=4 (up to 49/10 = 4), emitting 11,13,17,19,23,29,31,37,41,43,47.
        assert_eq!(&primes[4..], &[11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]);
        assert_eq!(descriptors.len(), 11);
        assert_eq!(cursor, 5);
    }

    #[test]
    fn preclears_anchor_square_so_it_is_not_reemitted() {
        let mut table = ResidueTable::new(21);
        let mut primes = bootstrap::seed(&mut table);
        table.clear_residue(0, 1);
        let mut descriptors = DescriptorCache::new();
        let mut cursor = 1usize;

        extract_more(&mut table, &mut primes, &mut descriptors, &mut cursor, 7, None);

        assert!(!primes.contains(&49));
    }

    #[test]
    fn stops_early_once_threshold_prime_is_reached() {
        let mut table = ResidueTable::new(21);
        let mut primes = bootstrap::seed(&mut table);
        table.clear_residue(0, 1);
        let mut descriptors = DescriptorCache::new();
        let mut cursor = 1usize;

        extract_more(&mut table, &mut primes, &mut descriptors, &mut cursor, 7, Some(20));

        // Should stop as soon as a prime >= 20 is emitted (23), not walk to 47.
        assert!(primes.last().copied().unwrap() >= 20);
        assert!(primes.last().copied().unwrap() < 40);
    }
}

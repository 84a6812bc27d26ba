//! Component C: hardcodes the first four primes and seeds the table with
//! 3's residue cycle.

use crate::residue_table::ResidueTable;

/// 3's composite pattern over `{1, 3, 7, 9}`, repeating every 3 slots (30
/// integers): decade 0 keeps 1 and 7 as candidates (`0b0101`), decade 1 keeps
/// all four (`0b1111`), decade 2 keeps 3 and 9 (`0b1010`) — every third
/// integer in `{1,3,7,9}`'s residue stream is a multiple of 3.
pub const PATTERN: [u8; 3] = [0b0000_0101, 0b0000_1111, 0b0000_1010];

/// The literal prime prefix delivered outside the residue table.
pub const BOOTSTRAP_PRIMES: [u64; 4] = [2, 3, 5, 7];

/// Number of primes in the hardcoded prefix. Sieving-index bookkeeping
/// ([`crate::cycle::DescriptorCache`], [`crate::block_sieve::ResumeState`])
/// is offset by this constant.
pub const BOOTSTRAP_PRIME_COUNT: usize = BOOTSTRAP_PRIMES.len();

/// Seeds `table` with 3's periodic composite pattern and returns the
/// hardcoded prime prefix `[2, 3, 5, 7]`.
///
/// Slot 0 (decade `0..=9`) is special: once seeded, its bit for residue 1
/// (representing the integer 1, which is not prime) is cleared separately
/// by the caller before extraction begins — see [`crate::sieve`].
pub fn seed(table: &mut ResidueTable) -> Vec<u64> {
    let slots = table.as_mut_slice();
    for (i, slot) in slots.iter_mut().enumerate() {
        *slot = PATTERN[i % 3];
    }
    // 3 itself lived at slot 0 (residue 3); it is already in the prime
    // prefix, so slot 0 is narrowed down to just its residue-1 candidate.
    slots[0] = 0b0000_0001;
    BOOTSTRAP_PRIMES.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_known_small_prime_pattern() {
        let mut table = ResidueTable::new(21);
        let primes = seed(&mut table);
        assert_eq!(primes, vec![2, 3, 5, 7]);
        // decade 1 (10..19): 11,13,17,19 all still candidates.
        assert_eq!(table.get(1), 0b0000_1111);
        // decade 2 (20..29): 23 and 29 remain; 21, 27 are multiples of 3.
        assert_eq!(table.get(2), 0b0000_1010);
        // decade 3 (30..39): 31 and 37 remain; 33, 39 are multiples of 3.
        assert_eq!(table.get(3), 0b0000_0101);
    }

    #[test]
    fn slot_zero_keeps_only_the_residue_one_candidate() {
        let mut table = ResidueTable::new(21);
        seed(&mut table);
        assert_eq!(table.get(0), 0b0000_0001);
    }
}

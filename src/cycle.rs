//! Component B: per-prime cycle jump offsets and residue-visit order.
//!
//! Every sieving prime `p` (`p >= 7`) removes composites from the table in
//! cycles of four: starting from a cycle base `i`, the four candidate
//! multiples of `p` in that decade-group land at slots `i + j0`, `i + j1`,
//! `i + j2`, `i + j3`. Which mask clears which of those four slots depends
//! only on `p mod 10` (the "group").

/// The four jump offsets for a prime `p`, derived once and cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleDescriptor {
    pub j0: u64,
    pub j1: u64,
    pub j2: u64,
    pub j3: u64,
}

impl CycleDescriptor {
    pub fn for_prime(p: u64) -> Self {
        CycleDescriptor {
            j0: p / 10,
            j1: 3 * p / 10,
            j2: 7 * p / 10,
            j3: 9 * p / 10,
        }
    }

    pub fn jumps(&self) -> [u64; 4] {
        [self.j0, self.j1, self.j2, self.j3]
    }
}

/// The residue-mask visit order for a prime's group (`p mod 10`). Position 0
/// always corresponds to `p`'s own residue class, since `p * 1` is always the
/// smallest of the four candidate multiples in a cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupDescriptor {
    pub m0: u8,
    pub m1: u8,
    pub m2: u8,
    pub m3: u8,
}

impl GroupDescriptor {
    pub fn for_prime(p: u64) -> Self {
        match p % 10 {
            1 => GroupDescriptor { m0: 14, m1: 13, m2: 11, m3: 7 },
            3 => GroupDescriptor { m0: 13, m1: 7, m2: 14, m3: 11 },
            7 => GroupDescriptor { m0: 11, m1: 14, m2: 7, m3: 13 },
            9 => GroupDescriptor { m0: 7, m1: 11, m2: 13, m3: 14 },
            other => unreachable!("sieving prime must end in 1, 3, 7 or 9, got {p} (mod 10 = {other})"),
        }
    }

    pub fn masks(&self) -> [u8; 4] {
        [self.m0, self.m1, self.m2, self.m3]
    }
}

/// Caches [`CycleDescriptor`]/[`GroupDescriptor`] pairs for every prime past
/// the hardcoded bootstrap prefix `[2, 3, 5, 7]`. Entries are appended once,
/// in discovery order, and never mutated afterward — indexed by "sieving
/// index" (a prime's position in [`crate::sieve::SieveContext::primes`] minus
/// [`crate::bootstrap::BOOTSTRAP_PRIME_COUNT`]).
#[derive(Debug, Default)]
pub struct DescriptorCache {
    cycles: Vec<CycleDescriptor>,
    groups: Vec<GroupDescriptor>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prime: u64) {
        self.cycles.push(CycleDescriptor::for_prime(prime));
        self.groups.push(GroupDescriptor::for_prime(prime));
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn cycle(&self, sieving_index: usize) -> &CycleDescriptor {
        &self.cycles[sieving_index]
    }

    pub fn group(&self, sieving_index: usize) -> &GroupDescriptor {
        &self.groups[sieving_index]
    }
}

//! The sieve orchestrator: wires components A through H together into one
//! run. This module owns no novel sieving logic of its own — it just
//! sequences bootstrap, wheel rolling, the extraction/sieve warm-up, and the
//! serial-or-parallel finishing pass in the order correctness requires.

use crate::block_sieve::{sieve_block_serial, ResumeState};
use crate::bootstrap::{self, BOOTSTRAP_PRIME_COUNT};
use crate::config::SieveConfig;
use crate::cycle::DescriptorCache;
use crate::errors::{SieveError, SieveResult};
use crate::extractor;
use crate::parallel_sieve;
use crate::residue_table::ResidueTable;
use crate::wheel;

/// Everything a completed sieve run hands to the output emitter.
pub struct SieveContext {
    table: ResidueTable,
    primes: Vec<u64>,
    cursor: usize,
    pub n: u64,
}

impl SieveContext {
    pub fn table(&self) -> &ResidueTable {
        &self.table
    }

    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    /// Index into `primes` up to which primes were individually discovered
    /// by the extractor; entries at or past this point in the table must be
    /// decoded fresh by the emitter.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

fn slot_count_for(n: u64) -> usize {
    ((n / 10) + 1) as usize
}

/// `floor(sqrt(x))` via Newton's method refinement, good for the modest
/// magnitudes the sieve ever computes a square root over (`10 * M`).
fn integer_sqrt(x: u128) -> u128 {
    if x == 0 {
        return 0;
    }
    let mut guess = (x as f64).sqrt() as u128 + 2;
    while guess * guess > x {
        guess -= 1;
    }
    while (guess + 1) * (guess + 1) <= x {
        guess += 1;
    }
    guess
}

/// Clamps a requested wheel depth down to the deepest wheel that still fits
/// in a table of `slot_count` slots, so a small `N` never has to fail with
/// [`SieveError::BadWheel`] just because the default depth is too deep.
pub fn effective_wheel_depth(requested: u32, slot_count: usize) -> u32 {
    let mut depth = requested.clamp(wheel::MIN_WHEEL_DEPTH, wheel::MAX_WHEEL_DEPTH);
    while depth > wheel::MIN_WHEEL_DEPTH {
        if let Ok(size) = wheel::wheel_size(depth) {
            if size as usize <= slot_count {
                break;
            }
        }
        depth -= 1;
    }
    depth
}

/// Runs the full pipeline and returns the populated context.
pub fn run(config: &SieveConfig) -> SieveResult<SieveContext> {
    if config.n == 0 || config.n > SieveConfig::MAX_BOUND {
        return Err(SieveError::BadBound(format!(
            "N must be in 1..={}, got {}",
            SieveConfig::MAX_BOUND,
            config.n
        )));
    }
    if config.workers < 1 {
        return Err(SieveError::Config("workers must be >= 1".to_string()));
    }

    // `block_size == 0` means "auto": size it from available memory, the
    // same override-vs-auto convention the teacher's `cpu_engine` uses for
    // `segment_size`.
    let block_size = if config.block_size == 0 {
        let auto = crate::memory::calculate_optimal_block_size(50.0, config.workers);
        log::info!("block size not set; auto-tuned to {auto} slots");
        auto
    } else {
        config.block_size
    };

    let requested_slots = slot_count_for(config.n);
    let mut table = ResidueTable::try_new(requested_slots)?;
    let m = table.len();
    log::info!("allocated residue table: {m} slots for N = {}", config.n);

    let mut primes = bootstrap::seed(&mut table);
    table.clear_residue(0, 1);

    let mut descriptors = DescriptorCache::new();
    let mut cursor = 1usize;

    // Anchor 7's batch always reaches at least 47 (floor(49/10)=4), past the
    // largest wheel prime any depth up to 7 could need (29).
    extractor::extract_more(&mut table, &mut primes, &mut descriptors, &mut cursor, 7, None);

    let depth = effective_wheel_depth(config.wheel_depth, m);
    if depth != config.wheel_depth {
        log::warn!(
            "wheel depth {} does not fit a {m}-slot table; using depth {depth} instead",
            config.wheel_depth
        );
    }
    let last_wheel_idx = wheel::roll_wheel(&mut table, &primes, depth)?;
    let last_wheel_prime = primes[last_wheel_idx];
    log::info!(
        "wheel depth {depth} rolled ({} slots), driven by primes up to {last_wheel_prime}",
        wheel::wheel_size(depth)?
    );
    extractor::extract_more(
        &mut table,
        &mut primes,
        &mut descriptors,
        &mut cursor,
        last_wheel_prime,
        None,
    );

    let l_slot = integer_sqrt(10u128 * m as u128) as u64;
    log::info!("sieving primes bounded by floor(sqrt(10M)) = {l_slot}");

    let mut resume_states: Vec<ResumeState> = Vec::new();
    let mut sieved_up_to: u64 = (wheel::wheel_size(depth)? as u64).min(m as u64) - 1;

    // Warm-up: alternately extend the sieved prefix far enough for the next
    // extraction batch to be trustworthy, then extract further, until every
    // prime up to l_slot is known.
    loop {
        while resume_states.len() < descriptors.len() {
            resume_states.push(ResumeState::default());
        }

        let largest_known = *primes.last().expect("bootstrap always seeds at least one prime");
        if largest_known >= l_slot || cursor >= m {
            break;
        }

        let next_square_slot = ((largest_known as u128 * largest_known as u128) / 10)
            .min(m as u128 - 1) as u64;
        if next_square_slot > sieved_up_to {
            sieve_block_serial(
                &mut table,
                &descriptors,
                &mut resume_states,
                &primes,
                BOOTSTRAP_PRIME_COUNT,
                primes.len() - 1,
                BOOTSTRAP_PRIME_COUNT,
                next_square_slot,
            );
            sieved_up_to = next_square_slot;
        }

        let emitted = extractor::extract_more(
            &mut table,
            &mut primes,
            &mut descriptors,
            &mut cursor,
            largest_known,
            Some(l_slot),
        );
        if emitted.is_none() {
            break;
        }
    }

    while resume_states.len() < descriptors.len() {
        resume_states.push(ResumeState::default());
    }

    // Every sieving prime needed for the rest of the table is now known and
    // cached. Finish sieving the remainder, serially or across a worker pool.
    let sieve_start_idx = BOOTSTRAP_PRIME_COUNT;
    let sieve_end_idx = primes.len() - 1;
    let remaining_start = (sieved_up_to as usize) + 1;

    if remaining_start < m {
        if config.workers == 1 {
            log::info!("finishing {} remaining slots serially", m - remaining_start);
            let mut stop = remaining_start as u64 + block_size - 1;
            loop {
                let actual_stop = stop.min(m as u64 - 1);
                sieve_block_serial(
                    &mut table,
                    &descriptors,
                    &mut resume_states,
                    &primes,
                    sieve_start_idx,
                    sieve_end_idx,
                    BOOTSTRAP_PRIME_COUNT,
                    actual_stop,
                );
                if actual_stop >= m as u64 - 1 {
                    break;
                }
                stop += block_size;
            }
        } else {
            log::info!(
                "finishing {} remaining slots across {} workers (block size {})",
                m - remaining_start,
                config.workers,
                block_size
            );
            parallel_sieve::sieve_region_parallel(
                &mut table,
                &primes,
                &descriptors,
                sieve_start_idx,
                sieve_end_idx,
                BOOTSTRAP_PRIME_COUNT,
                remaining_start,
                block_size,
                config.workers,
            )?;
        }
    }

    Ok(SieveContext { table, primes, cursor, n: config.n })
}

//! Memory-based auto-tuning for the residue table's block size, adapted from
//! the teacher's `calculate_optimal_segment_size`. The compression ratio is
//! fixed at one byte per decade (nominally ~4x over a flat bit-per-integer
//! sieve, since only `{1,3,7,9}` need representing) rather than varying by
//! wheel type.

use sysinfo::System;

/// Bytes of table per integer covered: one byte per ten integers.
const BYTES_PER_INTEGER: f64 = 0.1;

/// Total installed physical memory, in bytes.
pub fn get_total_memory() -> u64 {
    let mut sys = System::new_all();
    sys.refresh_memory();
    sys.total_memory()
}

/// Estimated bytes a block of `block_size` slots occupies in memory.
pub fn estimate_block_memory(block_size: u64) -> u64 {
    ((block_size as f64) * 1.2).max(1.0) as u64
}

/// Picks a block size (in table slots) that keeps per-worker memory within
/// `memory_usage_percent` of total system memory, clamped to a sane range.
pub fn calculate_optimal_block_size(memory_usage_percent: f64, num_threads: usize) -> u64 {
    let total_memory = get_total_memory();
    let percent = memory_usage_percent.clamp(10.0, 90.0);
    let allowed_memory = (total_memory as f64 * percent / 100.0) as u64;

    let safety_factor = 2.0;
    let per_thread_memory = allowed_memory / (num_threads as u64).max(1);
    let safe_memory = (per_thread_memory as f64 / safety_factor) as u64;

    // estimate_block_memory(size) = size * 1.2 ~= safe_memory => size = safe_memory / 1.2
    let block_size = (safe_memory as f64 / 1.2) as u64;

    let min_size = 10_000u64;
    let max_size = 50_000_000u64;
    block_size.clamp(min_size, max_size)
}

#[derive(Debug, Clone)]
pub struct MemoryInfo {
    pub total_memory: u64,
    pub block_memory: u64,
    pub estimated_total: u64,
    pub usage_percent: f64,
}

pub fn get_memory_info(block_size: u64, num_threads: usize) -> MemoryInfo {
    let total_memory = get_total_memory();
    let block_memory = estimate_block_memory(block_size);
    let estimated_total = block_memory * num_threads as u64;
    let usage_percent = if total_memory == 0 {
        0.0
    } else {
        (estimated_total as f64 / total_memory as f64) * 100.0
    };

    MemoryInfo { total_memory, block_memory, estimated_total, usage_percent }
}

impl MemoryInfo {
    pub fn format(&self) -> String {
        format!(
            "memory: system {:.1}GB, block {:.1}KB, estimated usage {:.1}MB ({:.1}%)",
            self.total_memory as f64 / (1024.0 * 1024.0 * 1024.0),
            self.block_memory as f64 / 1024.0,
            self.estimated_total as f64 / (1024.0 * 1024.0),
            self.usage_percent
        )
    }
}

/// Rough slot count a block size implies for `n`, used only to keep the log
/// line in [`crate::sieve::run`] informative about coverage relative to `n`.
pub fn integers_covered(block_size: u64) -> f64 {
    block_size as f64 / BYTES_PER_INTEGER
}

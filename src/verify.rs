//! Standalone audit of a finished output file, independent of the sieve core
//! so it can catch bugs in the core's own output that the core could never
//! notice about itself: values must climb strictly, none may be an even
//! composite, and a sample drawn from across the whole file must pass a
//! deterministic Miller-Rabin check.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::engine_types::PrimeResult;

/// Tunables for [`verify_primes_file`]. The defaults check the tail
/// contiguously (cheap, catches a truncated or corrupted last block) and
/// additionally spot-check one value out of every `spot_check_stride`
/// across the whole file, so a single bad value buried in the middle of a
/// multi-billion-line run still has a chance of being caught without
/// running Miller-Rabin over every line.
#[derive(Debug, Clone, Copy)]
pub struct VerifyOptions {
    pub sample_tail: usize,
    pub spot_check_stride: u64,
    pub log_every: u64,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self { sample_tail: 1_000, spot_check_stride: 250_000, log_every: 2_000_000 }
    }
}

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub count: u64,
    pub checked_tail: usize,
    pub spot_checked: u64,
    pub min: u64,
    pub max: u64,
}

pub type LogCallback = Box<dyn FnMut(String) + Send>;

/// Deterministic for every `n < 2^64`: this base set is exact (not
/// probabilistic) below that ceiling, so a `true` result here is a proof,
/// not a likelihood.
const WITNESSES: [u64; 7] = [2, 325, 9375, 28178, 450775, 9780504, 1795265022];

pub fn is_probable_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }
    !WITNESSES.iter().any(|&a| a % n != 0 && !witnesses_compositeness(n, d, r, a))
}

/// Returns `true` if round `a` is consistent with `n` being prime (i.e. it
/// fails to witness compositeness).
fn witnesses_compositeness(n: u64, d: u64, r: u32, a: u64) -> bool {
    let mut x = mod_pow(a, d, n);
    if x == 1 || x == n - 1 {
        return true;
    }
    for _ in 1..r {
        x = mod_mul(x, x, n);
        if x == n - 1 {
            return true;
        }
    }
    false
}

fn mod_mul(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn mod_pow(base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1u64;
    let mut b = base % m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mod_mul(result, b, m);
        }
        b = mod_mul(b, b, m);
        exp >>= 1;
    }
    result
}

/// Walks a file's values one at a time without caring whether they came from
/// ASCII lines or little-endian `u64` records, so the scan logic in
/// [`scan`] only has to be written once.
enum ValueStream {
    Text(io::Lines<BufReader<File>>),
    Binary { reader: BufReader<File>, remaining: u64 },
}

impl Iterator for ValueStream {
    type Item = io::Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ValueStream::Text(lines) => {
                let raw = lines.next()?;
                Some(raw.and_then(|line| {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        return Err(io::Error::new(io::ErrorKind::InvalidData, "blank line"));
                    }
                    trimmed
                        .parse::<u64>()
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
                }))
            }
            ValueStream::Binary { reader, remaining } => {
                if *remaining == 0 {
                    return None;
                }
                let mut buf = [0u8; 8];
                if let Err(e) = reader.read_exact(&mut buf) {
                    return Some(Err(e));
                }
                *remaining -= 1;
                Some(Ok(u64::from_le_bytes(buf)))
            }
        }
    }
}

pub fn verify_primes_file<P: AsRef<Path>>(
    path: P,
    opts: VerifyOptions,
    log_cb: Option<LogCallback>,
) -> PrimeResult<VerifyReport> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| describe_open_failure(path_ref, &e))?;

    let (stream, total_hint) = match path_ref.extension().and_then(|e| e.to_str()) {
        Some("bin") => {
            let byte_len = file.metadata().map_err(|e| format!("could not stat {path_ref:?}: {e}"))?.len();
            if byte_len % 8 != 0 {
                return Err(format!(
                    "{path_ref:?} is {byte_len} bytes, which is not a whole number of 8-byte records"
                )
                .into());
            }
            let remaining = byte_len / 8;
            let reader = BufReader::with_capacity(8 << 20, file);
            (ValueStream::Binary { reader, remaining }, Some(remaining))
        }
        _ => {
            let reader = BufReader::with_capacity(8 << 20, file);
            (ValueStream::Text(reader.lines()), None)
        }
    };

    scan(path_ref, stream, total_hint, &opts, log_cb)
}

fn describe_open_failure(path: &Path, e: &io::Error) -> String {
    match e.raw_os_error() {
        Some(code) => format!("could not open {path:?} (OS error {code}): {e}"),
        None => format!("could not open {path:?}: {e}"),
    }
}

/// Drives the monotonic/parity checks, the spread-out spot checks, and the
/// contiguous tail check over whatever `source` yields.
fn scan(
    path: &Path,
    source: ValueStream,
    total_hint: Option<u64>,
    opts: &VerifyOptions,
    mut log_cb: Option<LogCallback>,
) -> PrimeResult<VerifyReport> {
    let mut position = 0u64;
    let mut prev: Option<u64> = None;
    let mut min = None;
    let mut max = None;
    let mut spot_checked = 0u64;
    let mut tail: VecDeque<(u64, u64)> = VecDeque::with_capacity(opts.sample_tail.min(1 << 16));

    for item in source {
        position += 1;
        let n = item.map_err(|e| format!("{path:?}: I/O error reading value {position}: {e}"))?;

        if let Some(p) = prev {
            if n <= p {
                return Err(format!(
                    "{path:?}: value {n} at position {position} does not exceed the previous value {p}"
                )
                .into());
            }
        }
        if n > 2 && n % 2 == 0 {
            return Err(format!("{path:?}: position {position} holds an even composite: {n}").into());
        }

        min.get_or_insert(n);
        max = Some(n);
        prev = Some(n);

        if opts.sample_tail > 0 {
            if tail.len() == opts.sample_tail {
                tail.pop_front();
            }
            tail.push_back((position, n));
        }

        if opts.spot_check_stride > 0 && position % opts.spot_check_stride == 0 {
            spot_checked += 1;
            if !is_probable_prime(n) {
                return Err(format!("{path:?}: spot check failed at position {position}: {n} is composite").into());
            }
        }

        if opts.log_every > 0 && position % opts.log_every == 0 {
            if let Some(cb) = log_cb.as_mut() {
                cb(progress_message(path, position, n, total_hint));
            }
        }
    }

    if position == 0 {
        return Err(format!("{path:?}: no values to verify").into());
    }

    if let Some(cb) = log_cb.as_mut() {
        cb(format!("{path:?}: running Miller-Rabin over the last {} values", tail.len()));
    }
    for &(pos, n) in tail.iter() {
        if !is_probable_prime(n) {
            return Err(format!("{path:?}: tail check failed at position {pos}: {n} is composite").into());
        }
    }

    Ok(VerifyReport {
        count: position,
        checked_tail: tail.len(),
        spot_checked,
        min: min.expect("position > 0 implies at least one value was seen"),
        max: max.expect("position > 0 implies at least one value was seen"),
    })
}

fn progress_message(path: &Path, position: u64, current: u64, total_hint: Option<u64>) -> String {
    match total_hint {
        Some(total) if total > 0 => {
            let pct = position as f64 / total as f64 * 100.0;
            format!("{path:?}: {pct:.1}% ({position}/{total}), currently at {current}")
        }
        _ => format!("{path:?}: {position} values scanned, currently at {current}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn known_primes_and_composites_classify_correctly() {
        for &p in &[2u64, 3, 5, 7, 11, 104_729, 1_000_000_007] {
            assert!(is_probable_prime(p), "{p} should be prime");
        }
        for &c in &[1u64, 4, 9, 100, 1_000_000_001] {
            assert!(!is_probable_prime(c), "{c} should be composite");
        }
    }

    fn write_lines(lines: &[u64]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for n in lines {
            writeln!(f, "{n}").unwrap();
        }
        f.flush().unwrap();
        f
    }

    #[test]
    fn accepts_a_well_formed_ascending_file() {
        let f = write_lines(&[2, 3, 5, 7, 11, 13]);
        let report = verify_primes_file(f.path(), VerifyOptions::default(), None).unwrap();
        assert_eq!(report.count, 6);
        assert_eq!(report.min, 2);
        assert_eq!(report.max, 13);
    }

    #[test]
    fn rejects_a_non_increasing_sequence() {
        let f = write_lines(&[2, 3, 3, 7]);
        assert!(verify_primes_file(f.path(), VerifyOptions::default(), None).is_err());
    }

    #[test]
    fn rejects_an_even_composite() {
        let f = write_lines(&[2, 3, 5, 8]);
        assert!(verify_primes_file(f.path(), VerifyOptions::default(), None).is_err());
    }

    #[test]
    fn spot_checking_catches_a_composite_the_tail_window_would_miss() {
        // sample_tail of 1 only keeps the very last value; without the spot
        // check every other value in this file is unchecked by Miller-Rabin.
        let f = write_lines(&[3, 5, 9, 11]);
        let opts = VerifyOptions { sample_tail: 1, spot_check_stride: 1, log_every: 0 };
        assert!(verify_primes_file(f.path(), opts, None).is_err());
    }
}

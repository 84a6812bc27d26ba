//! Component H's writers, adapted from the teacher's `FilePrimeWriter` /
//! `LastPrimeWriter` / `OutputMetadata` trio: the emitter in
//! [`crate::emitter`] decides WHICH primes to stream, these types decide
//! WHERE they go.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::{OutputFormat, SieveConfig};

/// A snapshot of one completed run, written alongside the prime output for
/// reproducibility.
#[derive(Debug, Clone)]
pub struct OutputMetadata {
    pub bound: u64,
    pub count: u64,
    pub pi_x_verified: Option<bool>,
    pub execution_time_ms: u64,
    pub generated_at: String,
    pub tool_version: String,
    pub output_files: Vec<String>,
    pub primecount_version: Option<String>,
}

impl OutputMetadata {
    pub fn new(
        bound: u64,
        count: u64,
        pi_x_verified: Option<bool>,
        execution_time_ms: u64,
        output_files: Vec<String>,
        primecount_version: Option<String>,
    ) -> Self {
        Self {
            bound,
            count,
            pi_x_verified,
            execution_time_ms,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            output_files,
            primecount_version,
        }
    }

    /// Writes a human-readable report plus a snapshot of the settings that
    /// produced it, so a run can be reproduced from the report alone.
    pub fn write_to_file(&self, output_dir: &str, cfg: &SieveConfig) -> io::Result<PathBuf> {
        let base_dir = PathBuf::from(output_dir);
        if !output_dir.is_empty() {
            create_dir_all(&base_dir)?;
        }

        let meta_path = base_dir.join("primes.meta.txt");
        let file = File::create(&meta_path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "=== Prime Generation Report ===")?;
        writeln!(writer, "Bound (N): {}", self.bound)?;
        writeln!(writer, "Count: {}", self.count)?;
        match self.pi_x_verified {
            Some(true) => writeln!(writer, "pi(x) Verified: OK")?,
            Some(false) => writeln!(writer, "pi(x) Verified: MISMATCH")?,
            None => writeln!(writer, "pi(x) Verified: skipped")?,
        }
        writeln!(writer, "Execution Time: {} ms", self.execution_time_ms)?;
        writeln!(writer, "Generated: {}", self.generated_at)?;
        writeln!(writer, "Tool Version: {}", self.tool_version)?;

        if !self.output_files.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "--- Output Files ---")?;
            for f in &self.output_files {
                writeln!(writer, "{f}")?;
            }
        }

        if let Some(ref v) = self.primecount_version {
            writeln!(writer)?;
            writeln!(writer, "--- primecount Info ---")?;
            writeln!(writer, "primecount_version = {v}")?;
        }

        writeln!(writer)?;
        writeln!(writer, "--- Settings Snapshot ---")?;
        writeln!(writer, "n = {}", cfg.n)?;
        writeln!(writer, "wheel_depth = {}", cfg.wheel_depth)?;
        writeln!(writer, "block_size = {}", cfg.block_size)?;
        writeln!(writer, "workers = {}", cfg.workers)?;
        writeln!(writer, "output_format = {:?}", cfg.output_format)?;
        writeln!(writer, "output_dir = {}", cfg.output_dir)?;
        writeln!(writer, "last_prime_only = {}", cfg.last_prime_only)?;
        writer.flush()?;

        Ok(meta_path)
    }
}

pub trait PrimeWriter {
    fn write_prime(&mut self, p: u64) -> io::Result<()>;
    fn finish(&mut self) -> io::Result<()>;
}

/// Writes every emitted prime to a single file in `output_dir`, formatted
/// per [`OutputFormat`].
pub struct FilePrimeWriter {
    format: OutputFormat,
    writer: BufWriter<File>,
    first_item_in_json: bool,
    total_count: u64,
    output_path: PathBuf,
}

impl FilePrimeWriter {
    pub fn new(output_dir: &str, format: OutputFormat, buf_size: usize) -> io::Result<Self> {
        let base_dir = PathBuf::from(output_dir);
        if !output_dir.is_empty() {
            create_dir_all(&base_dir)?;
        }

        let ext = match format {
            OutputFormat::Text => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Binary => "bin",
        };
        let output_path = base_dir.join(Path::new(&format!("primes.{ext}")));
        let file = OpenOptions::new().create(true).truncate(true).write(true).open(&output_path)?;
        let mut writer = BufWriter::with_capacity(buf_size, file);

        let mut first_item_in_json = true;
        if let OutputFormat::Json = format {
            write!(writer, "[")?;
            first_item_in_json = true;
        }

        Ok(Self { format, writer, first_item_in_json, total_count: 0, output_path })
    }

    pub fn total_primes_written(&self) -> u64 {
        self.total_count
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl PrimeWriter for FilePrimeWriter {
    fn write_prime(&mut self, p: u64) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{p}")?,
            OutputFormat::Csv => writeln!(self.writer, "{p},")?,
            OutputFormat::Json => {
                if !self.first_item_in_json {
                    write!(self.writer, ",{p}")?;
                } else {
                    write!(self.writer, "{p}")?;
                    self.first_item_in_json = false;
                }
            }
            OutputFormat::Binary => self.writer.write_all(&p.to_le_bytes())?,
        }
        self.total_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        if let OutputFormat::Json = self.format {
            write!(self.writer, "]")?;
        }
        self.writer.flush()
    }
}

/// Keeps only the final prime and a running count, writing nothing to disk.
/// For `last_prime_only` runs where the individual primes are uninteresting.
#[derive(Default)]
pub struct LastPrimeWriter {
    last_prime: Option<u64>,
    total_count: u64,
}

impl LastPrimeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_last_prime(&self) -> Option<u64> {
        self.last_prime
    }

    pub fn total_primes_written(&self) -> u64 {
        self.total_count
    }
}

impl PrimeWriter for LastPrimeWriter {
    fn write_prime(&mut self, p: u64) -> io::Result<()> {
        self.last_prime = Some(p);
        self.total_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streams one ASCII decimal prime per line to stdout, buffered, for the
/// common CLI case of just printing the list rather than filing it.
pub struct StdoutPrimeWriter {
    writer: BufWriter<io::Stdout>,
    total_count: u64,
}

impl StdoutPrimeWriter {
    pub fn new() -> Self {
        Self { writer: BufWriter::new(io::stdout()), total_count: 0 }
    }

    pub fn total_primes_written(&self) -> u64 {
        self.total_count
    }
}

impl Default for StdoutPrimeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimeWriter for StdoutPrimeWriter {
    fn write_prime(&mut self, p: u64) -> io::Result<()> {
        writeln!(self.writer, "{p}")?;
        self.total_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SieveConfig;
    use tempfile::tempdir;

    #[test]
    fn file_writer_writes_one_prime_per_line_in_text_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        let mut writer = FilePrimeWriter::new(path, OutputFormat::Text, 4096).unwrap();
        for p in [2u64, 3, 5, 7] {
            writer.write_prime(p).unwrap();
        }
        writer.finish().unwrap();
        let contents = std::fs::read_to_string(writer.output_path()).unwrap();
        assert_eq!(contents, "2\n3\n5\n7\n");
    }

    #[test]
    fn json_writer_produces_a_valid_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        let mut writer = FilePrimeWriter::new(path, OutputFormat::Json, 4096).unwrap();
        for p in [2u64, 3, 5] {
            writer.write_prime(p).unwrap();
        }
        writer.finish().unwrap();
        let contents = std::fs::read_to_string(writer.output_path()).unwrap();
        assert_eq!(contents, "[2,3,5]");
    }

    #[test]
    fn last_prime_writer_keeps_only_the_final_value() {
        let mut writer = LastPrimeWriter::new();
        for p in [2u64, 3, 5, 7, 11] {
            writer.write_prime(p).unwrap();
        }
        assert_eq!(writer.get_last_prime(), Some(11));
        assert_eq!(writer.total_primes_written(), 5);
    }

    #[test]
    fn metadata_report_includes_settings_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        let cfg = SieveConfig { n: 100, ..SieveConfig::default() };
        let meta = OutputMetadata::new(100, 25, Some(true), 5, vec!["primes.txt".to_string()], None);
        let report_path = meta.write_to_file(path, &cfg).unwrap();
        let text = std::fs::read_to_string(report_path).unwrap();
        assert!(text.contains("Bound (N): 100"));
        assert!(text.contains("pi(x) Verified: OK"));
    }
}

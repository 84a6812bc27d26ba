//! Ambient configuration, adapted from the teacher's `settings.toml`
//! load/save convention: a [`SieveConfig`] round-trips through TOML via
//! `serde`, with defaults for anything a settings file omits.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
    Binary,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SieveConfig {
    /// Enumerate primes `<= n`.
    pub n: u64,
    /// Wheel depth, `1..=7`; deeper wheels pre-remove more small-prime
    /// composites by replication before the block sieve ever runs.
    #[serde(default = "default_wheel_depth")]
    pub wheel_depth: u32,
    /// Residue-table slots processed per segment.
    #[serde(default = "default_block_size")]
    pub block_size: u64,
    /// Worker threads for the finishing pass. `1` stays serial.
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// If set, report only the final prime and the total count instead of
    /// writing every prime found.
    #[serde(default)]
    pub last_prime_only: bool,
}

impl SieveConfig {
    /// The implementation ceiling: `N` large enough that `10 * N` would
    /// overflow slot-index arithmetic is rejected outright.
    pub const MAX_BOUND: u64 = u64::MAX / 10;
}

fn default_wheel_depth() -> u32 {
    3
}

fn default_block_size() -> u64 {
    32_000
}

fn default_workers() -> usize {
    1
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

impl Default for SieveConfig {
    fn default() -> Self {
        SieveConfig {
            n: 1_000_000,
            wheel_depth: default_wheel_depth(),
            block_size: default_block_size(),
            workers: default_workers(),
            output_format: OutputFormat::default(),
            output_dir: default_output_dir(),
            last_prime_only: false,
        }
    }
}

const SETTINGS_FILE: &str = "settings.toml";

pub fn load_or_create_config() -> Result<SieveConfig, Box<dyn std::error::Error + Send + Sync>> {
    if Path::new(SETTINGS_FILE).exists() {
        let mut file = File::open(SETTINGS_FILE)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg = toml::from_str(&contents)?;
        Ok(cfg)
    } else {
        let cfg = SieveConfig::default();
        save_config(&cfg)?;
        Ok(cfg)
    }
}

pub fn save_config(cfg: &SieveConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let toml_str = toml::to_string_pretty(cfg)?;
    let file = File::create(SETTINGS_FILE)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(toml_str.as_bytes())?;
    Ok(())
}

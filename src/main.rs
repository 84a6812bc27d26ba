use std::process::ExitCode;
use std::time::Instant;

use groupsieve::config::{self, OutputFormat, SieveConfig};
use groupsieve::errors::SieveError;
use groupsieve::output::{FilePrimeWriter, LastPrimeWriter, OutputMetadata, PrimeWriter, StdoutPrimeWriter};
use groupsieve::prime_pi::compute_prime_pi;
use groupsieve::verify::verify_primes_file;
use groupsieve::{emitter, sieve};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1).peekable();

    if let Some(first) = args.peek() {
        if first == "--prime-pi" {
            args.next();
            return run_prime_pi_cli(args.next());
        }
        if first == "--verify" {
            args.next();
            return run_verify_cli(args.next());
        }
    }

    match run_sieve_cli(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

/// `--prime-pi <x>`: print `pi(x)` via the `primecount` crate and exit.
fn run_prime_pi_cli(x_arg: Option<String>) -> ExitCode {
    let Some(x_str) = x_arg else {
        eprintln!("Usage: groupsieve --prime-pi <x>");
        return ExitCode::FAILURE;
    };
    let x = match x_str.parse::<u64>() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid x for --prime-pi: {x_str} ({e})");
            return ExitCode::FAILURE;
        }
    };
    match compute_prime_pi(x) {
        Ok(pi) => {
            println!("pi({x}) = {pi}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error while computing pi({x}): {e}");
            ExitCode::FAILURE
        }
    }
}

/// `--verify <path>`: audit a previously written primes file and exit.
fn run_verify_cli(path_arg: Option<String>) -> ExitCode {
    let Some(path) = path_arg else {
        eprintln!("Usage: groupsieve --verify <path>");
        return ExitCode::FAILURE;
    };
    let log_cb: groupsieve::verify::LogCallback = Box::new(|msg| log::info!("{msg}"));
    let opts = groupsieve::verify::VerifyOptions::default();
    match verify_primes_file(&path, opts, Some(log_cb)) {
        Ok(report) => {
            println!("OK: {} values verified, range [{}, {}]", report.count, report.min, report.max);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Verification failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Default mode: enumerate primes up to `N`, per `settings.toml` and CLI
/// overrides, writing output and a metadata report.
fn run_sieve_cli(args: impl Iterator<Item = String>) -> Result<(), ()> {
    let mut cfg = config::load_or_create_config().map_err(|e| eprintln!("config error: {e}"))?;
    let use_stdout = apply_cli_overrides(&mut cfg, args).map_err(|e| eprintln!("{e}"))?;

    let start = Instant::now();
    let ctx = sieve::run(&cfg).map_err(|e| {
        eprintln!("sieve error: {e}");
        log_exit_kind(&e);
    })?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let mut output_files = Vec::new();
    let count;

    if cfg.last_prime_only {
        let mut writer = LastPrimeWriter::new();
        emitter::emit_primes(&ctx, |p| writer.write_prime(p)).map_err(|e| eprintln!("write error: {e}"))?;
        writer.finish().ok();
        count = writer.total_primes_written();
        if let Some(last) = writer.get_last_prime() {
            println!("last prime <= {}: {last}", cfg.n);
        }
        println!("count: {count}");
    } else if use_stdout {
        let mut writer = StdoutPrimeWriter::new();
        emitter::emit_primes(&ctx, |p| writer.write_prime(p)).map_err(|e| eprintln!("write error: {e}"))?;
        writer.finish().map_err(|e| eprintln!("failed to flush stdout: {e}"))?;
        count = writer.total_primes_written();
    } else {
        let mut writer = FilePrimeWriter::new(&cfg.output_dir, cfg.output_format, 1 << 20)
            .map_err(|e| eprintln!("failed to open output file: {e}"))?;
        emitter::emit_primes(&ctx, |p| writer.write_prime(p)).map_err(|e| eprintln!("write error: {e}"))?;
        writer.finish().map_err(|e| eprintln!("failed to flush output file: {e}"))?;
        count = writer.total_primes_written();
        output_files.push(writer.output_path().display().to_string());
        println!("wrote {count} primes to {}", writer.output_path().display());
    }

    let meta = OutputMetadata::new(cfg.n, count, None, elapsed_ms, output_files, None);
    if let Err(e) = meta.write_to_file(&cfg.output_dir, &cfg) {
        eprintln!("warning: failed to write metadata report: {e}");
    }

    Ok(())
}

fn log_exit_kind(err: &SieveError) {
    log::error!("{err}");
}

/// Applies CLI overrides to `cfg`, returning whether `--stdout` was given.
fn apply_cli_overrides(cfg: &mut SieveConfig, mut args: impl Iterator<Item = String>) -> Result<bool, String> {
    let mut use_stdout = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--n" => cfg.n = next_arg(&mut args, "--n")?.parse().map_err(|e| format!("invalid --n: {e}"))?,
            "--wheel-depth" => {
                cfg.wheel_depth =
                    next_arg(&mut args, "--wheel-depth")?.parse().map_err(|e| format!("invalid --wheel-depth: {e}"))?
            }
            "--block-size" => {
                cfg.block_size =
                    next_arg(&mut args, "--block-size")?.parse().map_err(|e| format!("invalid --block-size: {e}"))?
            }
            "--workers" => {
                cfg.workers = next_arg(&mut args, "--workers")?.parse().map_err(|e| format!("invalid --workers: {e}"))?
            }
            "--output-dir" => cfg.output_dir = next_arg(&mut args, "--output-dir")?,
            "--format" => {
                cfg.output_format = match next_arg(&mut args, "--format")?.as_str() {
                    "text" => OutputFormat::Text,
                    "csv" => OutputFormat::Csv,
                    "json" => OutputFormat::Json,
                    "binary" => OutputFormat::Binary,
                    other => return Err(format!("unknown --format: {other}")),
                }
            }
            "--last-prime-only" => cfg.last_prime_only = true,
            "--stdout" => use_stdout = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(use_stdout)
}

fn next_arg(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} requires a value"))
}

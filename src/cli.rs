//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Printing contract:
//! primes go to stdout, one per line, so they can be piped or redirected;
//! summaries, tables, and logs go to stderr or are the command's whole
//! purpose (`algorithms`, `compare`) and get stdout to themselves.

use std::io::Write;

use anyhow::Result;
use farsieve::config::{EngineConfig, RemoteSection};
use farsieve::engine::Engine;

// ── Config Overrides ────────────────────────────────────────────

/// Fold command-line flags into the loaded config. `--threads` pins the
/// level of parallelism; `--endpoint` rewrites the configured remote URL,
/// or conjures a default remote section when the file had none.
pub fn apply_overrides(config: &mut EngineConfig, threads: Option<usize>, endpoint: Option<&str>) {
    if let Some(threads) = threads {
        config.engine.level_of_parallelism = Some(threads);
    }
    if let Some(endpoint) = endpoint {
        match &mut config.remote {
            Some(remote) => remote.endpoint = endpoint.to_string(),
            None => config.remote = Some(RemoteSection::with_endpoint(endpoint)),
        }
    }
}

// ── Subcommands ─────────────────────────────────────────────────

/// `compute`: primes to stdout, summary line to stderr.
pub fn run_compute(
    engine: &Engine,
    algorithm: &str,
    ceiling: u64,
    keep_last: Option<usize>,
) -> Result<()> {
    let calculation = engine.compute(algorithm, ceiling, keep_last)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for prime in &calculation.primes {
        writeln!(out, "{prime}")?;
    }
    out.flush()?;

    eprintln!(
        "{} primes <= {} in {:.3}s ({})",
        calculation.total_found,
        calculation.ceiling,
        calculation.elapsed.as_secs_f64(),
        calculation.algorithm
    );
    Ok(())
}

/// `algorithms`: one row per registered algorithm.
pub fn run_algorithms(engine: &Engine) -> Result<()> {
    for info in engine.algorithms() {
        let bound = match info.max_ceiling {
            Some(limit) => format!("up to {limit}"),
            None => "unbounded".to_string(),
        };
        println!("{:<18} {:<22} {}", info.name, bound, info.description);
    }
    Ok(())
}

/// `compare`: race the eligible algorithms, fastest first.
pub fn run_compare(engine: &Engine, ceiling: u64) -> Result<()> {
    let results = engine.compare(ceiling)?;
    println!(
        "{:<5} {:<18} {:>12} {:>10}",
        "rank", "algorithm", "primes", "seconds"
    );
    for (index, row) in results.iter().enumerate() {
        println!(
            "{:<5} {:<18} {:>12} {:>10.3}",
            index + 1,
            row.algorithm,
            row.total_found,
            row.elapsed.as_secs_f64()
        );
    }
    Ok(())
}

//! # Main — CLI Entry Point
//!
//! Parses arguments, wires logging and configuration, and routes the
//! subcommands to their execution functions in [`cli`].
//!
//! ## Subcommands
//!
//! - `compute`: run one algorithm up to a ceiling and print the primes.
//! - `algorithms`: list the registered algorithms and their ceilings.
//! - `compare`: race every eligible algorithm on the same ceiling.
//!
//! ## Global Options
//!
//! - `--config` / `FARSIEVE_CONFIG`: TOML file with engine tuning.
//! - `--endpoint` / `FARSIEVE_ENDPOINT`: remote sieving service; setting it
//!   registers the `segmented-remote` algorithm.
//! - `--threads`: worker threads for the segmented sieve (default: all
//!   logical cores).
//! - `--verbose`: debug logging to stderr (`RUST_LOG` still wins when set).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use farsieve::config::EngineConfig;
use farsieve::engine::Engine;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "farsieve", version, about = "Compute primes with interchangeable sieve algorithms")]
struct Cli {
    /// Path to a TOML config file with engine tuning (or set FARSIEVE_CONFIG)
    #[arg(long, env = "FARSIEVE_CONFIG")]
    config: Option<PathBuf>,

    /// Remote sieving endpoint, e.g. http://sieve:8080/segments. When set,
    /// the segmented-remote algorithm becomes available.
    #[arg(long, env = "FARSIEVE_ENDPOINT")]
    endpoint: Option<String>,

    /// Worker threads for the segmented sieve (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Log debug detail to stderr
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute all primes up to a ceiling
    Compute {
        /// Largest number to test for primality (inclusive)
        #[arg(long)]
        ceiling: u64,
        /// Algorithm to use (see `algorithms` for choices)
        #[arg(long, default_value = "segmented")]
        algorithm: String,
        /// Print only the last N primes; the full count is still reported
        #[arg(long)]
        keep_last: Option<usize>,
    },
    /// List the registered algorithms and their ceilings
    Algorithms,
    /// Run every eligible algorithm on the same ceiling and rank by speed
    Compare {
        /// Largest number to test for primality (inclusive)
        #[arg(long)]
        ceiling: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = EngineConfig::load(cli.config.as_deref())?;
    cli::apply_overrides(&mut config, cli.threads, cli.endpoint.as_deref());
    let engine = Engine::new(&config)?;

    match &cli.command {
        Commands::Compute {
            ceiling,
            algorithm,
            keep_last,
        } => cli::run_compute(&engine, algorithm, *ceiling, *keep_last),
        Commands::Algorithms => cli::run_algorithms(&engine),
        Commands::Compare { ceiling } => cli::run_compare(&engine, *ceiling),
    }
}

//! # Engine — Algorithm registry and request gate
//!
//! [`Engine`] is the one entry point callers use: it owns the registered
//! [`PrimeCalculator`]s, validates requests before any work starts, times
//! the calculation, and reports failures as typed [`EngineError`]s instead
//! of leaking each algorithm's internals.
//!
//! The registry is fixed at construction from config: `trial-division`,
//! `sieve`, and `segmented` always; `segmented-remote` only when a remote
//! endpoint is configured, so the listing never advertises an algorithm
//! that cannot run.
//!
//! Validation order is deliberate: malformed request, then unknown
//! algorithm, then ceiling bound. A ceiling past an algorithm's limit is
//! rejected in microseconds, not after minutes of sieving.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use crate::calculator::{EratosthenesSieve, PrimeCalculator, SegmentedSieve, TrialDivision};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::executor::{LocalExecutor, RemoteExecutor};

/// Result of one prime calculation.
#[derive(Debug)]
pub struct Calculation {
    pub algorithm: String,
    pub ceiling: u64,
    /// Primes found, ascending; truncated to the tail when `keep_last` was
    /// given.
    pub primes: Vec<u64>,
    /// Count found in `[2, ceiling]`, before any truncation.
    pub total_found: usize,
    pub elapsed: Duration,
}

/// One row of the algorithm listing.
#[derive(Debug)]
pub struct AlgorithmInfo {
    pub name: String,
    pub description: String,
    pub max_ceiling: Option<u64>,
}

/// One algorithm's showing in a comparison run.
#[derive(Debug)]
pub struct Comparison {
    pub algorithm: String,
    pub total_found: usize,
    pub elapsed: Duration,
}

/// Facade over the registered algorithms.
pub struct Engine {
    calculators: Vec<Box<dyn PrimeCalculator>>,
}

impl Engine {
    /// Build the registry from config. Construction can fail only on
    /// invalid tuning or an unbuildable thread pool, so a constructed
    /// engine is always ready to compute.
    pub fn new(config: &EngineConfig) -> Result<Engine> {
        config.validate()?;
        let mut calculators: Vec<Box<dyn PrimeCalculator>> = vec![
            Box::new(TrialDivision),
            Box::new(EratosthenesSieve),
            Box::new(SegmentedSieve::new(
                "segmented",
                "parallel segmented sieve on a local thread pool".to_string(),
                LocalExecutor,
                config.plan_params(),
            )?),
        ];
        if let Some(remote) = &config.remote {
            calculators.push(Box::new(SegmentedSieve::new(
                "segmented-remote",
                format!(
                    "parallel segmented sieve delegating segments to {}",
                    remote.endpoint
                ),
                RemoteExecutor::new(
                    &remote.endpoint,
                    remote.connect_timeout(),
                    remote.request_timeout(),
                ),
                remote.plan_params(config.engine.parallelism_lower_bound),
            )?));
        }
        Ok(Engine { calculators })
    }

    /// The registered algorithms, in registration order.
    pub fn algorithms(&self) -> Vec<AlgorithmInfo> {
        self.calculators
            .iter()
            .map(|calculator| AlgorithmInfo {
                name: calculator.name().to_string(),
                description: calculator.description().to_string(),
                max_ceiling: calculator.max_ceiling(),
            })
            .collect()
    }

    /// Compute all primes in `[2, ceiling]` with the named algorithm.
    ///
    /// `keep_last` truncates the returned list to its tail after the
    /// calculation; `total_found` always reports the untruncated count.
    pub fn compute(
        &self,
        algorithm: &str,
        ceiling: u64,
        keep_last: Option<usize>,
    ) -> Result<Calculation, EngineError> {
        validate_request(ceiling, keep_last)?;
        let calculator = self.find(algorithm)?;
        check_bound(calculator, ceiling)?;

        let started = Instant::now();
        let mut primes = calculator.calculate(ceiling)?;
        let elapsed = started.elapsed();
        let total_found = primes.len();

        if let Some(keep) = keep_last {
            if primes.len() > keep {
                primes.drain(..primes.len() - keep);
            }
        }

        info!(
            algorithm = calculator.name(),
            ceiling,
            total_found,
            elapsed_ms = elapsed.as_millis() as u64,
            "calculation complete"
        );

        Ok(Calculation {
            algorithm: calculator.name().to_string(),
            ceiling,
            primes,
            total_found,
            elapsed,
        })
    }

    /// Run every algorithm whose bound admits `ceiling`, fastest first.
    ///
    /// Out-of-range algorithms are skipped with a warning rather than
    /// failing the whole comparison; an actual calculation failure does
    /// fail it, since a partial table would misrepresent the contest.
    pub fn compare(&self, ceiling: u64) -> Result<Vec<Comparison>, EngineError> {
        validate_request(ceiling, None)?;
        let mut results = Vec::new();
        for calculator in &self.calculators {
            if let Some(limit) = calculator.max_ceiling() {
                if ceiling > limit {
                    warn!(
                        algorithm = calculator.name(),
                        limit, "skipping algorithm, ceiling exceeds its limit"
                    );
                    continue;
                }
            }
            let started = Instant::now();
            let primes = calculator.calculate(ceiling)?;
            results.push(Comparison {
                algorithm: calculator.name().to_string(),
                total_found: primes.len(),
                elapsed: started.elapsed(),
            });
        }
        results.sort_by_key(|comparison| comparison.elapsed);
        Ok(results)
    }

    fn find(&self, name: &str) -> Result<&dyn PrimeCalculator, EngineError> {
        self.calculators
            .iter()
            .find(|calculator| calculator.name() == name)
            .map(|calculator| calculator.as_ref())
            .ok_or_else(|| EngineError::UnknownAlgorithm {
                requested: name.to_string(),
                known: self
                    .calculators
                    .iter()
                    .map(|calculator| calculator.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

fn validate_request(ceiling: u64, keep_last: Option<usize>) -> Result<(), EngineError> {
    if ceiling <= 1 {
        return Err(EngineError::InvalidInput(format!(
            "ceiling must be greater than 1, got {ceiling}"
        )));
    }
    if keep_last == Some(0) {
        return Err(EngineError::InvalidInput(
            "keep_last must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn check_bound(calculator: &dyn PrimeCalculator, ceiling: u64) -> Result<(), EngineError> {
    match calculator.max_ceiling() {
        Some(limit) if ceiling > limit => Err(EngineError::RangeExceeded {
            algorithm: calculator.name().to_string(),
            ceiling,
            limit,
        }),
        _ => Ok(()),
    }
}

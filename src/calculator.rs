//! # Calculator — The interchangeable prime algorithms
//!
//! [`PrimeCalculator`] is the strategy seam the engine dispatches through:
//! a name to select by, a description for listings, an optional ceiling
//! bound, and the calculation itself. Three algorithms implement it:
//!
//! | name             | approach                                | bound          |
//! |------------------|-----------------------------------------|----------------|
//! | `trial-division` | divide each candidate by 2..=isqrt(n)   | none           |
//! | `sieve`          | one sieve of Eratosthenes over the range| 2^32 - 1       |
//! | `segmented`      | parallel segmented sieve                | (2^32 - 1)^2   |
//!
//! The segmented entry is generic over [`SegmentExecutor`], so the same
//! type also backs the remote variant; only the executor and the registered
//! name differ.

use anyhow::Result;

use crate::coordinator::SieveCoordinator;
use crate::executor::SegmentExecutor;
use crate::segment::PlanParams;
use crate::sieve;

/// Largest ceiling the segmented algorithms accept.
///
/// Segment 1 spans `2..=isqrt(ceiling)` and is the only part that runs
/// through the single-range kernel, so the ceiling may grow until its
/// square root hits the kernel's own limit.
pub const MAX_SEGMENTED_CEILING: u64 = (u32::MAX as u64) * (u32::MAX as u64);

/// A named prime-generation algorithm.
///
/// `calculate` returns every prime in `[2, ceiling]` in ascending order.
/// Implementations are selected by name at the engine boundary and must be
/// shareable across threads.
pub trait PrimeCalculator: Send + Sync {
    /// Stable identifier the engine selects by (e.g. `"segmented"`).
    fn name(&self) -> &str;

    /// One-line description for algorithm listings.
    fn description(&self) -> &str;

    /// Largest supported ceiling, or `None` if unbounded.
    fn max_ceiling(&self) -> Option<u64> {
        None
    }

    /// All primes in `[2, ceiling]`, ascending.
    fn calculate(&self, ceiling: u64) -> Result<Vec<u64>>;
}

/// Sequential trial division, one candidate at a time.
///
/// The baseline the sieves are measured against. No allocation proportional
/// to the range and no bound on the ceiling; the practical limit is the
/// caller's patience.
pub struct TrialDivision;

/// Divisors only need checking up to isqrt(n). The loop condition is phrased
/// as `divisor <= n / divisor` so nothing squares and overflows.
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2u64;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

impl PrimeCalculator for TrialDivision {
    fn name(&self) -> &str {
        "trial-division"
    }

    fn description(&self) -> &str {
        "sequential trial division of every candidate"
    }

    fn calculate(&self, ceiling: u64) -> Result<Vec<u64>> {
        Ok((2..=ceiling).filter(|&n| is_prime(n)).collect())
    }
}

/// Single-threaded sieve of Eratosthenes over the whole range at once.
pub struct EratosthenesSieve;

impl PrimeCalculator for EratosthenesSieve {
    fn name(&self) -> &str {
        "sieve"
    }

    fn description(&self) -> &str {
        "single-threaded sieve of Eratosthenes over the full range"
    }

    fn max_ceiling(&self) -> Option<u64> {
        Some(sieve::MAX_CEILING)
    }

    fn calculate(&self, ceiling: u64) -> Result<Vec<u64>> {
        sieve::sieve_primes(ceiling)
    }
}

/// Parallel segmented sieve, generic over where segments execute.
///
/// The registered name and description depend on the executor (local pool
/// against a remote service), so both are supplied at construction rather
/// than hardcoded per type.
pub struct SegmentedSieve<E> {
    name: &'static str,
    description: String,
    coordinator: SieveCoordinator<E>,
}

impl<E: SegmentExecutor> SegmentedSieve<E> {
    pub fn new(
        name: &'static str,
        description: String,
        executor: E,
        params: PlanParams,
    ) -> Result<Self> {
        Ok(SegmentedSieve {
            name,
            description,
            coordinator: SieveCoordinator::new(executor, params)?,
        })
    }
}

impl<E: SegmentExecutor> PrimeCalculator for SegmentedSieve<E> {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn max_ceiling(&self) -> Option<u64> {
        Some(MAX_SEGMENTED_CEILING)
    }

    fn calculate(&self, ceiling: u64) -> Result<Vec<u64>> {
        self.coordinator.calculate(ceiling)
    }
}

#[cfg(test)]
mod tests {
    //! # Calculator Tests
    //!
    //! Algorithm-independence is the core claim: every calculator must
    //! produce the list the pinned kernel produces. Trial division is also
    //! checked value by value against known primes and composites, and the
    //! segmented ceiling bound against the kernel limit it leans on.

    use super::*;
    use crate::executor::LocalExecutor;

    #[test]
    fn test_is_prime_known_values() {
        let primes = [2u64, 3, 5, 7, 11, 13, 97, 101, 7919];
        let composites = [0u64, 1, 4, 9, 15, 25, 49, 91, 7917];
        for &p in &primes {
            assert!(is_prime(p), "{p} is prime");
        }
        for &c in &composites {
            assert!(!is_prime(c), "{c} is not prime");
        }
    }

    /// 91 = 7 * 13 is the classic trial-division slip (no factor below 7).
    #[test]
    fn test_is_prime_semiprime_of_larger_factors() {
        assert!(!is_prime(91));
        assert!(!is_prime(313 * 317));
    }

    #[test]
    fn test_trial_division_matches_sieve() {
        assert_eq!(
            TrialDivision.calculate(2_000).unwrap(),
            sieve::sieve_primes(2_000).unwrap()
        );
    }

    #[test]
    fn test_segmented_local_matches_sieve() {
        let calculator = SegmentedSieve::new(
            "segmented",
            "parallel segmented sieve".to_string(),
            LocalExecutor,
            PlanParams {
                min_segment_size: 32,
                max_segment_size: 512,
                level_of_parallelism: 4,
                parallelism_lower_bound: 100,
            },
        )
        .unwrap();
        assert_eq!(
            calculator.calculate(5_000).unwrap(),
            sieve::sieve_primes(5_000).unwrap()
        );
    }

    /// The segmented bound exists so that isqrt(ceiling) always fits the
    /// kernel. Pin that relationship.
    #[test]
    fn test_segmented_bound_root_fits_kernel() {
        assert_eq!(MAX_SEGMENTED_CEILING.isqrt(), sieve::MAX_CEILING);
        assert_eq!(sieve::MAX_CEILING, u32::MAX as u64);
    }

    /// Names and bounds are part of the CLI contract; pin them.
    #[test]
    fn test_names_and_bounds_are_stable() {
        assert_eq!(TrialDivision.name(), "trial-division");
        assert_eq!(TrialDivision.max_ceiling(), None);
        assert_eq!(EratosthenesSieve.name(), "sieve");
        assert_eq!(EratosthenesSieve.max_ceiling(), Some(u32::MAX as u64));
    }
}

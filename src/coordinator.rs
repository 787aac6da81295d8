//! # Coordinator — Fan out segments, join them in order
//!
//! [`SieveCoordinator`] drives one segmented calculation end to end:
//!
//! 1. ask the planner for the segment list;
//! 2. sieve segment 1 directly with the kernel, which doubles as the
//!    small-prime base for everything after it;
//! 3. run the remaining segments on a dedicated rayon pool through the
//!    configured [`SegmentExecutor`];
//! 4. concatenate per-segment results in plan order.
//!
//! Step 4 needs no sort: the planner emits contiguous ascending segments and
//! `par_iter().collect()` preserves input order, so the concatenation is
//! already the ascending prime list. Any segment failure fails the whole
//! calculation; there is no partial result to return, because a hole in the
//! middle of the range would make the output a lie.
//!
//! The pool is private to the coordinator rather than rayon's global one, so
//! the configured level of parallelism holds even when the surrounding
//! process uses rayon for its own work.

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::debug;

use crate::executor::SegmentExecutor;
use crate::segment::{divide_into_segments, PlanParams};
use crate::sieve;

/// Segmented sieve driver, generic over where segments execute.
pub struct SieveCoordinator<E> {
    executor: E,
    params: PlanParams,
    pool: rayon::ThreadPool,
}

impl<E: SegmentExecutor> SieveCoordinator<E> {
    /// Build a coordinator with its own thread pool sized to the plan's
    /// level of parallelism.
    pub fn new(executor: E, params: PlanParams) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.level_of_parallelism)
            .build()
            .context("failed to build segment sieve thread pool")?;
        Ok(SieveCoordinator {
            executor,
            params,
            pool,
        })
    }

    /// All primes in `[2, ceiling]`, ascending.
    ///
    /// The caller is responsible for range validation; ceilings whose isqrt
    /// exceeds the kernel's limit still fail here, as an error rather than
    /// a panic.
    pub fn calculate(&self, ceiling: u64) -> Result<Vec<u64>> {
        let plan = divide_into_segments(ceiling, &self.params);

        // The planner always emits segment 1 covering 2..=isqrt(ceiling) (or
        // the whole range, below the parallel threshold). Sieving it directly
        // yields the base primes for every later segment.
        let first = plan[0];
        let mut primes = sieve::sieve_primes(first.upper_bound())?;
        if plan.len() == 1 {
            return Ok(primes);
        }

        debug!(
            executor = self.executor.name(),
            ceiling,
            segments = plan.len(),
            threads = self.params.level_of_parallelism,
            "fanning out segmented sieve"
        );

        let rest: Vec<Vec<u64>> = self.pool.install(|| {
            plan[1..]
                .par_iter()
                .map(|&segment| {
                    self.executor
                        .run_segment(&primes, segment)
                        .with_context(|| {
                            format!(
                                "segment [{}, {}] failed on {} executor",
                                segment.lower_bound,
                                segment.upper_bound(),
                                self.executor.name()
                            )
                        })
                })
                .collect::<Result<Vec<_>>>()
        })?;

        for mut segment_primes in rest {
            primes.append(&mut segment_primes);
        }
        Ok(primes)
    }
}

#[cfg(test)]
mod tests {
    //! # Coordinator Tests
    //!
    //! Segmented results are compared against the single-range kernel, which
    //! the sieve module has already pinned to known prime lists and pi(x)
    //! counts. Plan shapes are chosen to force many segments, a remainder
    //! tail, and the single-segment path. A deliberately failing executor
    //! checks that one bad segment sinks the whole calculation.

    use super::*;
    use crate::executor::LocalExecutor;
    use crate::segment::Segment;

    fn local(
        min_segment_size: u64,
        max_segment_size: u64,
        level_of_parallelism: usize,
        parallelism_lower_bound: u64,
    ) -> SieveCoordinator<LocalExecutor> {
        SieveCoordinator::new(
            LocalExecutor,
            PlanParams {
                min_segment_size,
                max_segment_size,
                level_of_parallelism,
                parallelism_lower_bound,
            },
        )
        .unwrap()
    }

    /// Tiny plans with many single-digit segments must still agree with the
    /// kernel. Ceiling 24 splits into six segments, 23 ends in a short tail.
    #[test]
    fn test_matches_kernel_on_tiny_plans() {
        let coordinator = local(2, u64::MAX, 5, 19);
        for ceiling in [20, 23, 24, 25, 30] {
            assert_eq!(
                coordinator.calculate(ceiling).unwrap(),
                sieve::sieve_primes(ceiling).unwrap(),
                "ceiling {ceiling}"
            );
        }
    }

    /// A mid-sized range across a few hundred segments.
    #[test]
    fn test_matches_kernel_at_ten_thousand() {
        let coordinator = local(16, 64, 4, 50);
        assert_eq!(
            coordinator.calculate(10_000).unwrap(),
            sieve::sieve_primes(10_000).unwrap()
        );
    }

    /// Below the parallel threshold the plan is one segment and the result
    /// comes straight from the kernel.
    #[test]
    fn test_single_segment_below_threshold() {
        let coordinator = local(10, 1_000, 4, 1_000);
        assert_eq!(
            coordinator.calculate(500).unwrap(),
            sieve::sieve_primes(500).unwrap()
        );
    }

    /// Concatenation order: strictly ascending output starting at 2, across
    /// every segment boundary.
    #[test]
    fn test_output_ascending_across_boundaries() {
        let coordinator = local(5, 50, 3, 10);
        let primes = coordinator.calculate(2_000).unwrap();
        assert_eq!(primes[0], 2);
        assert!(primes.windows(2).all(|w| w[0] < w[1]));
    }

    struct FailingExecutor;

    impl SegmentExecutor for FailingExecutor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run_segment(&self, _small_primes: &[u64], segment: Segment) -> Result<Vec<u64>> {
            anyhow::bail!("segment [{}, {}] refused", segment.lower_bound, segment.upper_bound())
        }
    }

    /// One failed segment fails the calculation, and the error names the
    /// segment that sank it.
    #[test]
    fn test_segment_failure_fails_calculation() {
        let coordinator = SieveCoordinator::new(
            FailingExecutor,
            PlanParams {
                min_segment_size: 10,
                max_segment_size: 100,
                level_of_parallelism: 2,
                parallelism_lower_bound: 10,
            },
        )
        .unwrap();
        let err = coordinator.calculate(1_000).unwrap_err();
        assert!(format!("{err:#}").contains("segment ["), "unexpected error: {err:#}");
    }

    /// Below the threshold the executor is never consulted, so even the
    /// failing one succeeds.
    #[test]
    fn test_failing_executor_unused_below_threshold() {
        let coordinator = SieveCoordinator::new(
            FailingExecutor,
            PlanParams {
                min_segment_size: 10,
                max_segment_size: 100,
                level_of_parallelism: 2,
                parallelism_lower_bound: 1_000,
            },
        )
        .unwrap();
        assert_eq!(
            coordinator.calculate(100).unwrap(),
            sieve::sieve_primes(100).unwrap()
        );
    }
}

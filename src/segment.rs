//! # Segment — Range partitioning for the segmented sieve
//!
//! A [`Segment`] is a contiguous slice of the candidate range `[2, ceiling]`
//! that one sieving task owns outright. [`divide_into_segments`] is the
//! planner: a pure function from `(ceiling, tuning)` to an ordered segment
//! list, with no knowledge of threads, pools, or peers. Everything the
//! parallel engine later relies on is decided here:
//!
//! - segments are contiguous and ascending, so concatenating per-segment
//!   results in plan order is already numerically sorted;
//! - the first segment always spans `2 ..= isqrt(ceiling)`, so sieving it
//!   alone yields every prime factor any later segment needs;
//! - the union of all segments is exactly `[2, ceiling]`, nothing dropped,
//!   nothing doubled.
//!
//! ## Planning rules
//!
//! 1. Ceilings at or below `parallelism_lower_bound` become a single segment;
//!    fan-out overhead loses on small ranges.
//! 2. Otherwise segment 1 spans `2 ..= isqrt(ceiling)`.
//! 3. The remaining range is split into equal segments of
//!    `clamp(ceil(range / level_of_parallelism), min, max)` candidates,
//!    further capped by [`SEGMENT_SIZE_LIMIT`] and by the range itself.
//! 4. The final segment absorbs the division remainder and is the only one
//!    allowed to be smaller than the rest.

use serde::{Deserialize, Serialize};

/// Hard cap on a single segment's size.
///
/// Segment sieving allocates one flag bit per candidate, so this bounds the
/// largest per-task allocation at 2^32-1 bits (512 MiB). The min/max tuning
/// knobs in [`PlanParams`] operate below this ceiling.
pub const SEGMENT_SIZE_LIMIT: u64 = u32::MAX as u64;

/// A contiguous sub-range of the candidate space, assigned to one sieving
/// task.
///
/// Index `lower_bound` is the first candidate and `size` the candidate
/// count, so the segment covers `lower_bound ..= upper_bound()`. Segments
/// are produced only by [`divide_into_segments`] and never mutated
/// afterwards; executors receive them by value. The type crosses the wire
/// to remote executors, hence the serde derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub lower_bound: u64,
    pub size: u64,
}

impl Segment {
    pub fn new(lower_bound: u64, size: u64) -> Self {
        debug_assert!(lower_bound >= 2, "segments start at 2, got {lower_bound}");
        debug_assert!(size >= 1, "segments hold at least one candidate");
        Segment { lower_bound, size }
    }

    /// Last candidate covered by this segment.
    #[inline]
    pub fn upper_bound(&self) -> u64 {
        self.lower_bound + self.size - 1
    }
}

/// Tuning knobs for [`divide_into_segments`].
#[derive(Debug, Clone, Copy)]
pub struct PlanParams {
    /// Smallest segment worth dispatching as its own task.
    pub min_segment_size: u64,
    /// Largest segment a single task should own (soft cap; the hard cap is
    /// [`SEGMENT_SIZE_LIMIT`]).
    pub max_segment_size: u64,
    /// Target number of concurrently executing segment tasks.
    pub level_of_parallelism: usize,
    /// Ceilings at or below this are sieved as one segment, sequentially.
    pub parallelism_lower_bound: u64,
}

/// Partition `[2, ceiling]` into an ordered list of segments.
///
/// Pure and deterministic: identical inputs always produce identical plans.
/// The first segment is special (it is sieved directly, never against a
/// small-prime base); all others are sized by the rules above. Requires
/// `ceiling > 1` and `1 <= min_segment_size <= max_segment_size`.
pub fn divide_into_segments(ceiling: u64, params: &PlanParams) -> Vec<Segment> {
    debug_assert!(ceiling > 1, "ceiling must be at least 2, got {ceiling}");
    debug_assert!(
        params.min_segment_size >= 1 && params.min_segment_size <= params.max_segment_size,
        "segment size bounds out of order: min {} max {}",
        params.min_segment_size,
        params.max_segment_size
    );

    // Rule 1. Ceilings of 2 and 3 also land here regardless of the configured
    // bound: below 4 there is no isqrt-sized first segment to carve out.
    if ceiling <= params.parallelism_lower_bound.max(3) {
        return vec![Segment::new(2, ceiling - 1)];
    }

    // Rule 2. Sieving 2..=isqrt(ceiling) directly yields the small-prime
    // base; every composite above it has a factor inside it.
    let sqrt_floor = ceiling.isqrt();
    let first = Segment::new(2, sqrt_floor - 1);

    let remaining_range = ceiling - first.size - 1;
    let mut segments = vec![first];
    if remaining_range == 0 {
        return segments;
    }

    // Rules 3 and 4.
    let segment_size = plan_segment_size(remaining_range, params);
    let full_segments = remaining_range / segment_size;
    let remainder = remaining_range % segment_size;

    let mut lower_bound = first.upper_bound() + 1;
    for _ in 0..full_segments {
        segments.push(Segment::new(lower_bound, segment_size));
        lower_bound += segment_size;
    }
    if remainder > 0 {
        segments.push(Segment::new(lower_bound, remainder));
    }
    segments
}

/// Segment size for the range beyond segment 1: an even split across the
/// level of parallelism, clamped into the configured window, then capped so
/// no segment outgrows its flag array or the range itself.
fn plan_segment_size(remaining_range: u64, params: &PlanParams) -> u64 {
    let level = params.level_of_parallelism.max(1) as u64;
    remaining_range
        .div_ceil(level)
        .clamp(params.min_segment_size, params.max_segment_size)
        .min(SEGMENT_SIZE_LIMIT)
        .min(remaining_range)
}

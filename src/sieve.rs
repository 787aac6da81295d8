//! # Sieve — Bit-array kernel and per-segment sieving
//!
//! The two sieving primitives everything else is built from:
//!
//! 1. **Single-range kernel** ([`sieve_primes`]): a straight sieve of
//!    Eratosthenes over `[2, ceiling]`. Used directly by the single-threaded
//!    algorithm, and by the segmented engine to produce the small-prime base
//!    from segment 1.
//! 2. **Segment sieve** ([`sieve_segment`]): marks composites inside an
//!    offset range using an already-computed small-prime base. This is the
//!    unit of work the parallel engine fans out, locally or to a peer.
//!
//! Both share [`CompositeFlags`], a packed bit array where a set bit means
//! "composite". The polarity is deliberate: a freshly allocated all-zero
//! array already encodes "every candidate might be prime", so no
//! initialization pass is needed, only marking.
//!
//! ## Why segments work
//!
//! Every composite `c <= ceiling` has a prime factor `<= isqrt(ceiling)`.
//! Sieving `2 ..= isqrt(ceiling)` once therefore yields a base that can
//! eliminate every composite in any later segment, and segments never need
//! to look at each other.

use anyhow::{ensure, Result};

use crate::segment::Segment;

/// Largest ceiling the single-range kernel accepts.
///
/// One flag bit per candidate puts a full-range sieve at this ceiling at
/// 2^32-1 bits (512 MiB), the practical limit for one allocation. It also
/// serves as the guarantee that `isqrt` of the segmented engine's ceiling
/// always fits in a single kernel run.
pub const MAX_CEILING: u64 = u32::MAX as u64;

/// Packed per-candidate composite flags.
///
/// 8x denser than `Vec<bool>`; bit `i` lives in word `i / 64` at position
/// `i % 64`. A set bit (1) means the candidate is **composite**; a clear bit
/// means it has survived every marking pass so far. What index `i` stands
/// for is the caller's business: the kernel maps it to `i + 2`, the segment
/// sieve to `lower_bound + i`.
pub struct CompositeFlags {
    words: Vec<u64>,
    len: usize,
}

impl CompositeFlags {
    /// Flag array for `len` candidates, nothing marked yet.
    pub fn new(len: usize) -> Self {
        CompositeFlags {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Number of candidates tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mark candidate `index` as composite.
    #[inline]
    pub fn mark(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "flag index out of bounds: {} >= {}",
            index,
            self.len
        );
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    /// Whether candidate `index` has been marked composite.
    #[inline]
    pub fn is_marked(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "flag index out of bounds: {} >= {}",
            index,
            self.len
        );
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Number of unmarked candidates, via hardware POPCNT over the words.
    pub fn count_unmarked(&self) -> usize {
        let marked: usize = self.words.iter().map(|w| w.count_ones() as usize).sum();
        self.len - marked
    }

    /// Iterate the indices of unmarked candidates in ascending order.
    ///
    /// Each word is inverted so survivors become set bits, then walked with
    /// the `trailing_zeros` trick. The unused high bits of the last word are
    /// masked off so they never surface as phantom candidates.
    pub fn iter_unmarked(&self) -> impl Iterator<Item = usize> + '_ {
        let len = self.len;
        let last_word = self.words.len().saturating_sub(1);
        self.words.iter().enumerate().flat_map(move |(wi, &word)| {
            let mut survivors = !word;
            if wi == last_word {
                let used = len - wi * 64;
                if used < 64 {
                    survivors &= (1u64 << used) - 1;
                }
            }
            BitIter {
                word: survivors,
                base: wi * 64,
            }
        })
    }
}

/// Iterator over set bits within a single u64 word.
struct BitIter {
    word: u64,
    base: usize,
}

impl Iterator for BitIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1; // clear lowest set bit
        Some(self.base + tz)
    }
}

/// All primes in `[2, ceiling]`, ascending, by sieve of Eratosthenes.
///
/// Flags are indexed by `candidate - 2`. For each unmarked `n` with
/// `n * n <= ceiling`, multiples are marked from `n * n` upward; smaller
/// multiples of `n` already carry a factor below `n` and were marked
/// earlier. All arithmetic stays in `u64`, so nothing overflows below
/// [`MAX_CEILING`].
///
/// The engine validates ceilings before dispatch; this checks again and
/// errors rather than panicking if handed one out of range.
pub fn sieve_primes(ceiling: u64) -> Result<Vec<u64>> {
    ensure!(ceiling >= 2, "sieve ceiling must be at least 2, got {ceiling}");
    ensure!(
        ceiling <= MAX_CEILING,
        "sieve ceiling {ceiling} exceeds the single-range limit {MAX_CEILING}"
    );

    let mut flags = CompositeFlags::new((ceiling - 1) as usize);
    let mut n = 2u64;
    while n * n <= ceiling {
        if !flags.is_marked((n - 2) as usize) {
            let mut multiple = n * n;
            while multiple <= ceiling {
                flags.mark((multiple - 2) as usize);
                multiple += n;
            }
        }
        n += 1;
    }
    Ok(flags.iter_unmarked().map(|index| index as u64 + 2).collect())
}

/// Primes within one non-initial segment, sieved against a small-prime base.
///
/// The flag array is local: index `i` stands for `segment.lower_bound + i`.
/// For each base prime `p`, the first multiple of `p` at or past the lower
/// bound sits at local index `(p - lower_bound % p) % p`; every `p`-th index
/// after it is marked. Survivors map back through the lower bound, and local
/// ascending order is already numeric ascending order.
///
/// Correct only under the planner's guarantees: the base holds every prime
/// `<= isqrt(segment upper bound)`, and the segment starts above the largest
/// base prime (so `p`'s multiples in range are all true composites).
pub fn sieve_segment(small_primes: &[u64], segment: Segment) -> Vec<u64> {
    let mut flags = CompositeFlags::new(segment.size as usize);
    for &p in small_primes {
        let remainder = segment.lower_bound % p;
        let mut index = if remainder == 0 { 0 } else { p - remainder };
        while index < segment.size {
            flags.mark(index as usize);
            index += p;
        }
    }
    flags
        .iter_unmarked()
        .map(|index| segment.lower_bound + index as u64)
        .collect()
}

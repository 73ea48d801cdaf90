//! Unbiased bounded random sampling
//!
//! Draws integers uniformly from a closed interval by rejection sampling
//! over a raw 32-bit entropy word. Reducing a raw word with modulo is
//! deliberately avoided: it over-represents low values whenever the
//! interval width does not evenly divide the word's range.

use crate::entropy::EntropySource;
use crate::types::{MachineError, Result};
use log::warn;

/// Number of distinct values a raw entropy word can take (2^32).
const WORD_RANGE: u64 = 1 << 32;

/// Rejection sampler over a hardware entropy source.
///
/// Owns the entropy source for its lifetime; each instance is independent,
/// so samplers may be created freely in any task context.
pub struct BoundedRng<E: EntropySource> {
    entropy: E,
}

impl<E: EntropySource> BoundedRng<E> {
    /// Create a sampler over the given entropy source.
    pub fn new(entropy: E) -> Self {
        Self { entropy }
    }

    /// Consume the sampler and return the underlying entropy source.
    pub fn into_inner(self) -> E {
        self.entropy
    }

    /// Draw a uniform value from `[0, max]`.
    ///
    /// Every `u32` bound is valid, including `u32::MAX` (the full word
    /// range), so this form cannot fail.
    pub fn sample_upto(&mut self, max: u32) -> u32 {
        self.draw_at_most(max)
    }

    /// Draw a uniform value from `[min, max]`.
    ///
    /// The interval must be non-empty and its width must fit the 32-bit
    /// entropy word: `max - min <= u32::MAX`. Violations are rejected
    /// before any entropy is drawn.
    pub fn sample(&mut self, min: i64, max: i64) -> Result<i64> {
        if max < min {
            warn!("Rejected empty sampling range [{}, {}]", min, max);
            return Err(MachineError::InvalidRange);
        }
        let width = (max as i128) - (min as i128);
        if width > u32::MAX as i128 {
            warn!("Sampling range [{}, {}] wider than entropy word", min, max);
            return Err(MachineError::InvalidRange);
        }
        // width <= u32::MAX, and min + draw <= max, so the i64 sum cannot
        // overflow.
        Ok(min + self.draw_at_most(width as u32) as i64)
    }

    /// Uniform draw from `[0, max]` by rejection.
    ///
    /// The word range splits into `max + 1` bins of `bin_size` draws each,
    /// plus a short tail of `defect` draws that cannot be distributed
    /// evenly. Draws landing in the tail are discarded and redrawn; the
    /// expected number of iterations approaches 1 as `defect` shrinks
    /// relative to the word range.
    fn draw_at_most(&mut self, max: u32) -> u32 {
        let num_bins = max as u64 + 1;
        // num_bins == WORD_RANGE degenerates to bin_size 1, defect 0:
        // every draw accepted, returned unchanged.
        let bin_size = WORD_RANGE / num_bins;
        let defect = WORD_RANGE % num_bins;

        loop {
            let draw = self.entropy.next_u32() as u64;
            if draw < WORD_RANGE - defect {
                // Truncating division is exact: draw is confined to the
                // evenly binned region.
                return (draw / bin_size) as u32;
            }
        }
    }
}

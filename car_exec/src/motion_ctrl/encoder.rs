//! Encoder sampling
//!
//! Holds the now/previous cumulative count pair for each wheel and produces
//! per-tick deltas. Must be updated exactly once per regulator tick for the
//! deltas to correspond to one tick period.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::NUM_WHEELS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-wheel cumulative encoder counts, now and previous.
#[derive(Clone, Copy, Debug, Default)]
pub struct EncoderSampler {
    counts_last: [i32; NUM_WHEELS],

    /// False until the first sample has been taken, so the first delta is
    /// zero rather than the full cumulative count.
    primed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EncoderSampler {
    /// Take a sample, returning the count deltas since the previous sample.
    pub fn sample(&mut self, counts_now: [i32; NUM_WHEELS]) -> [i32; NUM_WHEELS] {
        let mut deltas = [0i32; NUM_WHEELS];

        if self.primed {
            for i in 0..NUM_WHEELS {
                deltas[i] = counts_now[i].wrapping_sub(self.counts_last[i]);
            }
        }

        self.counts_last = counts_now;
        self.primed = true;

        deltas
    }

    /// Forget the sampling history, as on a stop. The next sample after a
    /// reset produces zero deltas.
    pub fn reset(&mut self) {
        self.primed = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_sample_is_zero() {
        let mut sampler = EncoderSampler::default();
        assert_eq!(sampler.sample([100, -50, 3000, 7]), [0; 4]);
    }

    #[test]
    fn test_deltas() {
        let mut sampler = EncoderSampler::default();
        sampler.sample([100, 100, 100, 100]);
        assert_eq!(sampler.sample([110, 95, 100, 200]), [10, -5, 0, 100]);
        assert_eq!(sampler.sample([110, 95, 100, 200]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_counter_wrap() {
        let mut sampler = EncoderSampler::default();
        sampler.sample([i32::MAX, 0, 0, 0]);
        assert_eq!(sampler.sample([i32::MIN + 9, 0, 0, 0]), [10, 0, 0, 0]);
    }

    #[test]
    fn test_reset_reprimes() {
        let mut sampler = EncoderSampler::default();
        sampler.sample([0; 4]);
        sampler.reset();
        assert_eq!(sampler.sample([500, 500, 500, 500]), [0; 4]);
    }
}

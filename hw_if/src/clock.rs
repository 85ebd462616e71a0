//! # Monotonic time source

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Instant;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A monotonic millisecond counter.
///
/// All debounce and dwell windows in the software are polled against this
/// counter, never against hardware alarms.
pub trait Clock {
    /// Milliseconds since some fixed epoch. Monotonic, never wraps in a
    /// session.
    fn now_millis(&self) -> u64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A [`Clock`] backed by [`std::time::Instant`].
pub struct MonotonicClock {
    epoch: Instant,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

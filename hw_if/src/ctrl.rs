//! # Feedback-control capability
//!
//! The low-level feedback-gain module is external to this software and is
//! consumed as an opaque capability: one instance per wheel speed loop and
//! one for the heading trim loop.

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single closed feedback loop.
///
/// Called once per regulator tick with the target and measured value in the
/// same units; returns the actuation effort. Implementations may keep
/// internal state (integrators, previous error) between calls.
pub trait SpeedLoop {
    /// Advance the loop one tick and return the actuation effort.
    fn update(&mut self, target: f64, measured: f64) -> f64;

    /// Clear all internal state, as on a stop or mode change.
    fn reset(&mut self);
}

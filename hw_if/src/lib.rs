//! # Hardware interface crate.
//!
//! Provides the trait seams and shared data types for all equipment the
//! control software talks to. The executable never touches a peripheral
//! directly: everything below this crate (PWM setup, quadrature capture,
//! button debouncing, the buzzer/RGB board) is a collaborator reached
//! through one of these traits.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command and sensing definitions for equipment (motors, line sensors, encoders, indicator)
pub mod eqpt;

/// Opaque feedback-control capability
pub mod ctrl;

/// Monotonic time source
pub mod clock;

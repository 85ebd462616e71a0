//! Motion control module
//!
//! Converts commanded body velocities into per-wheel speed targets and
//! regulates those targets against encoder feedback every tick, producing
//! signed duty demands for the motor driver.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod encoder;
mod kinematics;
mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use encoder::*;
pub use kinematics::*;
pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of driven wheels, re-exported for per-wheel arrays.
pub use hw_if::eqpt::motor::NUM_WHEELS;

/// Maximum magnitude of any speed setpoint or wheel target.
///
/// Units: mm/s
pub const MAX_SPEED_MM_S: f64 = 1000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A body-frame velocity.
///
/// `vy_mm_s` is accepted for interface completeness but this chassis cannot
/// produce lateral motion, so it never reaches the wheels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BodyVelocity {
    /// Forward speed. Units: mm/s
    pub vx_mm_s: f64,

    /// Lateral speed. Units: mm/s
    pub vy_mm_s: f64,

    /// Yaw rate, positive turning right. Units: mrad/s
    pub vz_mrad_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MotionCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum MotionCtrlError {
    #[error("The speed loops have not been initialised, was init called?")]
    LoopsNotInit,
}

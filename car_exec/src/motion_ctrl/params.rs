//! Parameters structure for MotionCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Motion control.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance travelled by a wheel in one full revolution.
    ///
    /// Units: millimeters
    pub wheel_circumference_mm: f64,

    /// Encoder counts per full wheel revolution (gearbox ratio x disc lines
    /// x quadrature edges).
    pub counts_per_rev: f64,

    /// Half of the sum of the axle spacings, the moment arm used to convert
    /// a yaw rate into a left/right wheel speed difference.
    ///
    /// Units: millimeters
    pub half_axle_span_mm: f64,

    // ---- REGULATION ----

    /// Period of the regulator tick.
    ///
    /// Units: milliseconds
    pub tick_period_ms: f64,

    /// Maximum magnitude of the duty demand sent to the motor driver.
    pub max_duty: i16,

    /// Additive duty applied to any nonzero demand to overcome actuator
    /// stiction near zero.
    pub deadzone_duty: i16,

    /// Wheel speed loop proportional gain.
    pub wheel_k_p: f64,

    /// Wheel speed loop integral gain.
    pub wheel_k_i: f64,

    /// Wheel speed loop derivative gain.
    pub wheel_k_d: f64,

    /// Heading trim loop proportional gain.
    pub heading_k_p: f64,

    /// Heading trim loop integral gain.
    pub heading_k_i: f64,

    /// Heading trim loop derivative gain.
    pub heading_k_d: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Flight values for the 450 RPM chassis, matching
    /// `params/motion_ctrl.toml`. Used by tests so they don't touch the
    /// filesystem.
    fn default() -> Self {
        Params {
            wheel_circumference_mm: 204.203,
            counts_per_rev: 1040.0,
            half_axle_span_mm: 159.0,
            tick_period_ms: 10.0,
            max_duty: 3600,
            deadzone_duty: 2000,
            wheel_k_p: 1.2,
            wheel_k_i: 2.4,
            wheel_k_d: 0.0,
            heading_k_p: 120.0,
            heading_k_i: 0.0,
            heading_k_d: 4.0,
        }
    }
}

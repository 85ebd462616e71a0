//! PID speed-loop implementation
//!
//! A fixed-period PID controller implementing the opaque [`SpeedLoop`]
//! capability. The regulator tick is deterministic, so the timestep is a
//! construction parameter rather than being measured at runtime.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use hw_if::ctrl::SpeedLoop;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Fixed timestep between updates, seconds
    dt_s: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains and timestep.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, dt_s: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            dt_s,
            integral: 0f64,
            prev_error: None,
        }
    }

    /// Get the value of the controller for the given error.
    pub fn get(&mut self, error: f64) -> f64 {
        // Accumulate the integral term.
        self.integral += error * self.dt_s;

        // Calculate the derivative.
        //
        // On the first update there is no previous error, and assuming a zero
        // one would produce a derivative kick, so no derivative is applied.
        let deriv = match self.prev_error {
            Some(e) => (error - e) / self.dt_s,
            None => 0f64,
        };

        // Calculate the output
        let out = self.k_p * error + self.k_i * self.integral + self.k_d * deriv;

        // Remember the previous error
        self.prev_error = Some(error);

        out
    }

    /// Clear the integral accumulation and error history.
    pub fn clear(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }
}

impl SpeedLoop for PidController {
    fn update(&mut self, target: f64, measured: f64) -> f64 {
        self.get(target - measured)
    }

    fn reset(&mut self) {
        self.clear()
    }
}

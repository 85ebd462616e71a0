//! Line tracking module
//!
//! Maps the discrete line sensor pattern onto per-wheel speed targets, both
//! for straight line following and for the fixed-radius arc segments of the
//! course. The mapping is data-driven so steering behaviour can be reviewed
//! and tuned without touching control flow.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
mod table;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;
pub use table::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of an arc segment, named for the side the car turns towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ArcDir {
    Left,
    Right,
}

/// What the tracker should be steering along this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteerDirective {
    /// Follow the line under the sensor array.
    Line,

    /// Drive a fixed-radius arc, using the sensors only for small
    /// corrections.
    Arc {
        dir: ArcDir,

        /// Inner-pair speed as a percentage of the outer-pair speed,
        /// clamped to [0, 100].
        radius_pct: u8,
    },
}

/// Possible errors that can occur during LineTrack operation.
#[derive(Debug, thiserror::Error)]
pub enum LineTrackError {
    #[error("Base speed {0} mm/s is outside the valid range (0, 1000]")]
    InvalidBaseSpeed(f64),
}

//! Parameters structure for LineTrack

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Line tracking.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Cruise speed used when the line is centred.
    ///
    /// Units: mm/s, valid range (0, 1000]
    pub base_speed_mm_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            base_speed_mm_s: 500.0,
        }
    }
}

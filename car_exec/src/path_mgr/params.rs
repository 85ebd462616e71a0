//! Parameters structure for PathMgr

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Path management.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- COURSE TIMING ----

    /// Minimum time between two waypoint detections, so one physical
    /// crossing seen over several supervisory steps counts once.
    ///
    /// Units: milliseconds
    pub waypoint_dwell_ms: u64,

    /// Minimum time in an arc before the reacquired-line exit condition is
    /// considered, rejecting stale straight-line patterns at arc entry.
    ///
    /// Units: milliseconds
    pub arc_min_time_ms: u64,

    /// Length of the stationary pause between laps of the looping task.
    ///
    /// Units: milliseconds
    pub lap_pause_ms: u64,

    // ---- VERDICT LIMITS ----

    /// Time limit for task 1. Units: milliseconds
    pub task1_limit_ms: u64,

    /// Time limit for task 2. Units: milliseconds
    pub task2_limit_ms: u64,

    /// Time limit for task 3. Units: milliseconds
    pub task3_limit_ms: u64,

    /// Time limit for task 4. Units: milliseconds
    pub task4_limit_ms: u64,

    // ---- GEOMETRY ----

    /// Inner-pair speed as a percentage of the outer-pair speed while
    /// driving an arc.
    pub arc_radius_pct: u8,

    /// Number of laps that completes the looping task.
    pub laps_target: u8,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            waypoint_dwell_ms: 500,
            arc_min_time_ms: 1500,
            lap_pause_ms: 500,
            task1_limit_ms: 15_000,
            task2_limit_ms: 30_000,
            task3_limit_ms: 40_000,
            task4_limit_ms: 140_000,
            arc_radius_pct: 60,
            laps_target: 4,
        }
    }
}

//! Path status telemetry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{ArcSegment, MotionMode, Verdict, Waypoint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of the path manager state, written into the session at task
/// completion and loggable at any time.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PathStatus {
    /// Active task.
    pub mode: MotionMode,

    /// Waypoint most recently passed.
    pub waypoint: Waypoint,

    /// Arc currently being driven, if any.
    pub arc: Option<ArcSegment>,

    /// Completed laps of the looping task.
    pub lap_count: u8,

    /// True once the task has finished and the car latched stopped.
    pub completed: bool,

    /// Time since the task started. Units: milliseconds
    pub elapsed_ms: u64,

    /// Verdict against the task time limit, set at completion.
    pub verdict: Option<Verdict>,
}

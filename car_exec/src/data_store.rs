//! # Data Store

use hw_if::eqpt::line::SensorStatus;
use hw_if::eqpt::motor::MotorDems;

use crate::{line_track, motion_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a supervisory boundary
    pub is_supervisory_cycle: bool,

    /// Elapsed time since the session started
    pub elapsed_time_s: f64,

    // MotionCtrl
    pub motion_ctrl: motion_ctrl::MotionCtrl,
    pub motion_ctrl_input: motion_ctrl::InputData,
    pub motion_ctrl_output: MotorDems,
    pub motion_ctrl_status_rpt: motion_ctrl::StatusReport,

    // LineTrack
    pub line_track: line_track::LineTrack,
    pub line_track_status_rpt: line_track::StatusReport,

    /// Line sensor pattern decoded this supervisory cycle
    pub sensor_status: SensorStatus,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the supervisory
    /// cycle flag.
    pub fn cycle_start(&mut self, supervisory_divisor: u128) {
        self.is_supervisory_cycle = self.num_cycles % supervisory_divisor == 0;

        self.motion_ctrl_input = motion_ctrl::InputData::default();
        self.motion_ctrl_output = MotorDems::default();
        self.motion_ctrl_status_rpt = motion_ctrl::StatusReport::default();

        self.elapsed_time_s = util::session::get_elapsed_seconds();
    }
}

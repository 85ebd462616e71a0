//! Implementations for the LineTrack state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{
    action_speeds, arc_speeds, classify_arc, classify_line, LineTrackError, Params, SteerDirective,
};
use crate::motion_ctrl::NUM_WHEELS;
use hw_if::eqpt::line::SensorStatus;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Line tracking module state
#[derive(Default)]
pub struct LineTrack {
    params: Params,

    report: StatusReport,

    /// Last wheel speed command, held when the line disappears while
    /// following a straight leg. Zero until the first pattern resolves.
    last_cmd_mm_s: [f64; NUM_WHEELS],
}

/// Input data to Line Tracking.
#[derive(Clone, Copy, Debug)]
pub struct InputData {
    /// Decoded line sensor pattern for this step.
    pub status: SensorStatus,

    /// What to steer along.
    pub directive: SteerDirective,
}

/// Status report for LineTrack processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Current cruise speed. Units: mm/s
    pub base_speed_mm_s: f64,

    /// True if this step held the previous command rather than computing a
    /// fresh one.
    pub holding: bool,
}

/// Output from Line Tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutputData {
    /// Wheel speed targets in wheel order. Units: mm/s
    pub wheel_speeds_mm_s: [f64; NUM_WHEELS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LineTrack {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LineTrackError;

    /// Initialise the LineTrack module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        Ok(())
    }

    /// Compute the wheel speed targets for the current sensor pattern.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport {
            base_speed_mm_s: self.params.base_speed_mm_s,
            holding: false,
        };

        let speeds = match input_data.directive {
            SteerDirective::Line => {
                let action = classify_line(input_data.status);

                match action_speeds(action, self.params.base_speed_mm_s) {
                    Some(speeds) => speeds,
                    None => {
                        // Line lost, hold the last command so a gap in the
                        // marking doesn't stop the car
                        self.report.holding = true;
                        self.last_cmd_mm_s
                    }
                }
            }
            SteerDirective::Arc { dir, radius_pct } => {
                let outer = self.params.base_speed_mm_s;
                let inner = outer * f64::from(radius_pct.min(100)) / 100.0;

                arc_speeds(dir, classify_arc(input_data.status), inner, outer)
            }
        };

        self.last_cmd_mm_s = speeds;

        Ok((
            OutputData {
                wheel_speeds_mm_s: speeds,
            },
            self.report,
        ))
    }
}

impl LineTrack {
    /// Create a module with the given parameters, without touching the
    /// filesystem.
    pub fn with_params(params: Params) -> Self {
        LineTrack {
            params,
            ..LineTrack::default()
        }
    }

    /// Change the cruise speed.
    ///
    /// Speeds outside (0, 1000] mm/s are rejected and the current speed is
    /// left unchanged.
    pub fn set_base_speed(&mut self, speed_mm_s: f64) -> Result<(), LineTrackError> {
        if speed_mm_s <= 0.0 || speed_mm_s > 1000.0 {
            return Err(LineTrackError::InvalidBaseSpeed(speed_mm_s));
        }

        self.params.base_speed_mm_s = speed_mm_s;
        Ok(())
    }
}

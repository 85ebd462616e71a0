//! Path management module
//!
//! Drives the task/waypoint/arc hierarchy for the four competition tasks.
//! Each supervisory step the manager looks at the decoded line sensor
//! pattern and the clock, advances its waypoint and arc state, and emits a
//! steering directive for the tracker or a stop for the regulator. Timing
//! is purely compare-against-the-clock, the manager never blocks.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod route;
mod status;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
pub use params::*;
pub use route::*;
pub use status::*;

use crate::line_track::SteerDirective;
use hw_if::eqpt::line::SensorStatus;
use hw_if::eqpt::motor::StopMode;
use util::params as param_load;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Top level motion mode, one of the four tasks or idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MotionMode {
    /// No task active, the car stays stopped.
    Idle,

    /// Straight run from A to B.
    Task1,

    /// Half course: A, B, arc to C, D, arc back to A.
    Task2,

    /// Full figure-of-eight: A, C, arc to B, D, arc back to A.
    Task3,

    /// The figure-of-eight driven for a number of laps.
    Task4,
}

/// Course waypoints. `None` is the out-of-course placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Waypoint {
    None,
    A,
    B,
    C,
    D,
}

/// The four arc segments of the course, named entry-to-exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ArcSegment {
    /// B to C, turning left.
    Bc,

    /// D to A, turning right.
    Da,

    /// C to B, turning right.
    Cb,

    /// A to D, turning left.
    Ad,
}

/// Whether the task finished inside its time limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    OnTime,
    Late,
}

/// What the rest of the system should do as a result of a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathMgrOutput {
    /// Nothing new, previous demands stand.
    None,

    /// Keep driving, steering along the given directive.
    Track(SteerDirective),

    /// Stop the car in the given mode.
    Stop(StopMode),
}

/// Notable occurrences, surfaced so the executive can drive the indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathEvent {
    /// A waypoint crossing was registered.
    WaypointReached(Waypoint),

    /// A lap of the looping task finished, with the new lap count.
    LapComplete(u8),

    /// The task finished and the car is latched stopped.
    TaskComplete(Verdict),
}

/// Possible errors during PathMgr operation.
#[derive(Debug, thiserror::Error)]
pub enum PathMgrError {
    #[error("Failed to load path manager parameters: {0}")]
    ParamLoadError(#[from] param_load::LoadError),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of a path manager step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutput {
    pub output: PathMgrOutput,

    /// At most one event per step, the most significant one.
    pub event: Option<PathEvent>,
}

/// The path manager.
pub struct PathMgr {
    params: Params,

    mode: MotionMode,
    waypoint: Waypoint,
    arc: Option<ArcSegment>,
    lap_count: u8,
    completed: bool,
    verdict: Option<Verdict>,

    /// Time the current task started. Units: milliseconds
    start_ms: u64,

    /// Time of the last registered waypoint crossing, for the dwell.
    last_waypoint_ms: u64,

    /// Time the current arc was entered.
    arc_entry_ms: u64,

    /// End of the inter-lap pause, if one is in progress.
    pause_until_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StepOutput {
    /// A step with no output and no event.
    fn none() -> Self {
        StepOutput {
            output: PathMgrOutput::None,
            event: None,
        }
    }
}

impl PathMgr {
    /// Initialise the path manager from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, PathMgrError> {
        Ok(Self::with_params(param_load::load(params_path)?))
    }

    /// Create a manager with the given parameters, without touching the
    /// filesystem.
    pub fn with_params(params: Params) -> Self {
        PathMgr {
            params,
            mode: MotionMode::Idle,
            waypoint: Waypoint::A,
            arc: None,
            lap_count: 0,
            completed: false,
            verdict: None,
            start_ms: 0,
            last_waypoint_ms: 0,
            arc_entry_ms: 0,
            pause_until_ms: None,
        }
    }

    /// The active motion mode.
    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    /// True once the active task has finished.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Switch task, discarding all progress of the previous one.
    ///
    /// The car is always stopped on a mode change, even mid-arc.
    pub fn set_mode(&mut self, mode: MotionMode, now_ms: u64) -> StepOutput {
        info!("PathMgr mode change: {:?} -> {:?}", self.mode, mode);

        self.mode = mode;
        self.waypoint = Waypoint::A;
        self.arc = None;
        self.lap_count = 0;
        self.completed = false;
        self.verdict = None;
        self.start_ms = now_ms;
        self.last_waypoint_ms = now_ms;
        self.arc_entry_ms = 0;
        self.pause_until_ms = None;

        StepOutput {
            output: PathMgrOutput::Stop(StopMode::Brake),
            event: None,
        }
    }

    /// Advance the path state machine by one supervisory step.
    pub fn step(&mut self, status: SensorStatus, now_ms: u64) -> StepOutput {
        // Nothing to do while idle or after completion, the stop issued at
        // completion latches in the regulator
        if self.mode == MotionMode::Idle || self.completed {
            return StepOutput::none();
        }

        // Stand still through the inter-lap pause
        if let Some(until) = self.pause_until_ms {
            if now_ms < until {
                return StepOutput::none();
            }
            self.pause_until_ms = None;
        }

        match self.arc {
            Some(arc) => self.step_arc(arc, status, now_ms),
            None => self.step_leg(status, now_ms),
        }
    }

    /// Snapshot of the current state.
    pub fn status(&self, now_ms: u64) -> PathStatus {
        PathStatus {
            mode: self.mode,
            waypoint: self.waypoint,
            arc: self.arc,
            lap_count: self.lap_count,
            completed: self.completed,
            elapsed_ms: now_ms.saturating_sub(self.start_ms),
            verdict: self.verdict,
        }
    }

    /// Step while on a straight leg: watch for the full-width crossing that
    /// marks the next waypoint, otherwise keep line following.
    fn step_leg(&mut self, status: SensorStatus, now_ms: u64) -> StepOutput {
        let dwell_over = now_ms.saturating_sub(self.last_waypoint_ms) >= self.params.waypoint_dwell_ms;

        if status.is_all_on() && dwell_over {
            return self.register_crossing(now_ms);
        }

        StepOutput {
            output: PathMgrOutput::Track(SteerDirective::Line),
            event: None,
        }
    }

    /// Step while driving an arc: exit when the line is reacquired under the
    /// centre pair, but not before the minimum arc time has passed.
    fn step_arc(&mut self, arc: ArcSegment, status: SensorStatus, now_ms: u64) -> StepOutput {
        let min_time_over = now_ms.saturating_sub(self.arc_entry_ms) >= self.params.arc_min_time_ms;

        if min_time_over && status.centre_reacquired() {
            return self.exit_arc(arc, now_ms);
        }

        StepOutput {
            output: PathMgrOutput::Track(SteerDirective::Arc {
                dir: arc_dir(arc),
                radius_pct: self.params.arc_radius_pct,
            }),
            event: None,
        }
    }

    /// Register a waypoint crossing and work out what follows it.
    fn register_crossing(&mut self, now_ms: u64) -> StepOutput {
        self.last_waypoint_ms = now_ms;

        let reached = match next_waypoint(self.mode, self.waypoint) {
            Some(wp) => wp,
            None => {
                // A crossing the route didn't expect: the state has drifted,
                // re-anchor at A and carry on rather than stopping dead
                warn!(
                    "Unexpected crossing at waypoint {:?} in {:?}, re-anchoring at A",
                    self.waypoint, self.mode
                );
                self.waypoint = Waypoint::A;
                return StepOutput {
                    output: PathMgrOutput::Track(SteerDirective::Line),
                    event: Some(PathEvent::WaypointReached(Waypoint::A)),
                };
            }
        };

        info!("Waypoint {:?} reached", reached);
        self.waypoint = reached;

        // The short straight run ends at B
        if self.mode == MotionMode::Task1 && reached == Waypoint::B {
            return self.complete(now_ms);
        }

        if let Some(arc) = arc_entry(self.mode, reached) {
            info!("Entering arc {:?}", arc);
            self.arc = Some(arc);
            self.arc_entry_ms = now_ms;

            return StepOutput {
                output: PathMgrOutput::Track(SteerDirective::Arc {
                    dir: arc_dir(arc),
                    radius_pct: self.params.arc_radius_pct,
                }),
                event: Some(PathEvent::WaypointReached(reached)),
            };
        }

        StepOutput {
            output: PathMgrOutput::Track(SteerDirective::Line),
            event: Some(PathEvent::WaypointReached(reached)),
        }
    }

    /// Leave an arc at its exit waypoint. Reaching A closes the loop, which
    /// completes the task or the lap depending on the mode.
    fn exit_arc(&mut self, arc: ArcSegment, now_ms: u64) -> StepOutput {
        let exit = arc_exit(arc);

        info!("Arc {:?} complete, at waypoint {:?}", arc, exit);
        self.arc = None;
        self.waypoint = exit;
        self.last_waypoint_ms = now_ms;

        if exit != Waypoint::A {
            return StepOutput {
                output: PathMgrOutput::Track(SteerDirective::Line),
                event: Some(PathEvent::WaypointReached(exit)),
            };
        }

        match self.mode {
            MotionMode::Task4 => {
                self.lap_count += 1;
                info!("Lap {} complete", self.lap_count);

                if self.lap_count >= self.params.laps_target {
                    return self.complete(now_ms);
                }

                self.pause_until_ms = Some(now_ms + self.params.lap_pause_ms);

                StepOutput {
                    output: PathMgrOutput::Stop(StopMode::Brake),
                    event: Some(PathEvent::LapComplete(self.lap_count)),
                }
            }
            _ => self.complete(now_ms),
        }
    }

    /// Latch the task complete and judge it against the time limit.
    fn complete(&mut self, now_ms: u64) -> StepOutput {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        let verdict = match self.time_limit_ms() {
            Some(limit) if elapsed > limit => Verdict::Late,
            _ => Verdict::OnTime,
        };

        info!(
            "{:?} complete in {} ms: {:?}",
            self.mode, elapsed, verdict
        );

        self.completed = true;
        self.verdict = Some(verdict);

        StepOutput {
            output: PathMgrOutput::Stop(StopMode::Brake),
            event: Some(PathEvent::TaskComplete(verdict)),
        }
    }

    /// Time limit for the active task.
    fn time_limit_ms(&self) -> Option<u64> {
        match self.mode {
            MotionMode::Idle => None,
            MotionMode::Task1 => Some(self.params.task1_limit_ms),
            MotionMode::Task2 => Some(self.params.task2_limit_ms),
            MotionMode::Task3 => Some(self.params.task3_limit_ms),
            MotionMode::Task4 => Some(self.params.task4_limit_ms),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::line_track::ArcDir;

    const CENTRED: SensorStatus = SensorStatus(0b0110);
    const CROSSING: SensorStatus = SensorStatus(0b1111);
    const LOST: SensorStatus = SensorStatus(0b0000);

    fn mgr(mode: MotionMode) -> PathMgr {
        let mut mgr = PathMgr::with_params(Params::default());
        mgr.set_mode(mode, 0);
        mgr
    }

    /// Drive one leg-then-arc half of the figure-of-eight, returning the
    /// step output of the arc exit.
    fn half_lap(mgr: &mut PathMgr, t0: u64) -> StepOutput {
        // Straight leg to the crossing
        assert_eq!(
            mgr.step(CENTRED, t0).output,
            PathMgrOutput::Track(SteerDirective::Line)
        );
        let out = mgr.step(CROSSING, t0 + 1000);
        assert!(matches!(out.event, Some(PathEvent::WaypointReached(_))));

        // Around the arc until the line comes back
        mgr.step(LOST, t0 + 1500);
        mgr.step(LOST, t0 + 2000);
        mgr.step(CENTRED, t0 + 3000)
    }

    #[test]
    fn test_idle_is_inert() {
        let mut mgr = PathMgr::with_params(Params::default());

        let out = mgr.step(CROSSING, 1000);
        assert_eq!(out.output, PathMgrOutput::None);
        assert_eq!(out.event, None);
    }

    #[test]
    fn test_mode_change_stops_and_resets() {
        let out = mgr(MotionMode::Task1).set_mode(MotionMode::Idle, 100);
        assert_eq!(out.output, PathMgrOutput::Stop(StopMode::Brake));
    }

    #[test]
    fn test_crossing_dwell_counts_once() {
        let mut mgr = mgr(MotionMode::Task2);

        // A crossing inside the dwell window of the mode change is ignored
        assert_eq!(mgr.step(CROSSING, 100).event, None);
        assert_eq!(mgr.step(CROSSING, 400).event, None);

        // Past the dwell it registers, once
        let out = mgr.step(CROSSING, 600);
        assert_eq!(out.event, Some(PathEvent::WaypointReached(Waypoint::B)));
    }

    #[test]
    fn test_task1_completes_at_b_on_time() {
        let mut mgr = mgr(MotionMode::Task1);

        // The straight run: one crossing, B, done
        let out = mgr.step(CROSSING, 5000);

        assert_eq!(out.output, PathMgrOutput::Stop(StopMode::Brake));
        assert_eq!(out.event, Some(PathEvent::TaskComplete(Verdict::OnTime)));
        assert!(mgr.is_completed());

        // Once complete the manager is inert
        assert_eq!(mgr.step(CROSSING, 6000), StepOutput::none());
    }

    #[test]
    fn test_task1_late_verdict() {
        let mut mgr = mgr(MotionMode::Task1);

        let out = mgr.step(CROSSING, 20_000);

        assert_eq!(out.event, Some(PathEvent::TaskComplete(Verdict::Late)));
    }

    #[test]
    fn test_task2_full_course() {
        let mut mgr = mgr(MotionMode::Task2);

        // From A the first crossing is B, which enters the left arc to C
        let out = mgr.step(CROSSING, 3000);
        assert_eq!(out.event, Some(PathEvent::WaypointReached(Waypoint::B)));
        assert_eq!(
            out.output,
            PathMgrOutput::Track(SteerDirective::Arc {
                dir: ArcDir::Left,
                radius_pct: 60,
            })
        );

        // Line patterns inside the minimum arc time don't exit the arc
        let out = mgr.step(CENTRED, 3200);
        assert!(matches!(
            out.output,
            PathMgrOutput::Track(SteerDirective::Arc { .. })
        ));

        // Reacquired after the minimum time: at C, back on the line
        let out = mgr.step(CENTRED, 5000);
        assert_eq!(out.event, Some(PathEvent::WaypointReached(Waypoint::C)));
        assert_eq!(out.output, PathMgrOutput::Track(SteerDirective::Line));

        // D enters the right arc home
        let out = mgr.step(CROSSING, 6000);
        assert_eq!(out.event, Some(PathEvent::WaypointReached(Waypoint::D)));

        // Closing the loop at A completes the task
        let out = mgr.step(CENTRED, 8000);
        assert_eq!(out.event, Some(PathEvent::TaskComplete(Verdict::OnTime)));
        assert_eq!(out.output, PathMgrOutput::Stop(StopMode::Brake));
    }

    #[test]
    fn test_task4_runs_four_laps() {
        let mut mgr = mgr(MotionMode::Task4);
        let mut t = 1000u64;

        for lap in 1..=3u8 {
            // A -> C -> arc -> B
            let out = half_lap(&mut mgr, t);
            assert_eq!(out.event, Some(PathEvent::WaypointReached(Waypoint::B)));

            // B -> D -> arc -> A, which closes the lap
            let out = half_lap(&mut mgr, t + 3500);
            assert_eq!(out.event, Some(PathEvent::LapComplete(lap)));
            assert_eq!(out.output, PathMgrOutput::Stop(StopMode::Brake));

            // Stationary through the pause window
            assert_eq!(mgr.step(CENTRED, t + 6700), StepOutput::none());

            t += 8000;
        }

        // Fourth lap completes the task
        half_lap(&mut mgr, t);
        let out = half_lap(&mut mgr, t + 3500);
        assert_eq!(out.event, Some(PathEvent::TaskComplete(Verdict::OnTime)));
        assert!(mgr.is_completed());

        // A fifth lap's worth of patterns does nothing
        assert_eq!(mgr.step(CROSSING, t + 8000), StepOutput::none());
        assert_eq!(mgr.status(t + 8000).lap_count, 4);
    }

    #[test]
    fn test_task4_late_when_over_limit() {
        let mut mgr = mgr(MotionMode::Task4);
        let mut t = 1000u64;

        // Each lap takes 40 s, blowing the 140 s limit on the last one
        for _ in 0..4 {
            half_lap(&mut mgr, t);
            half_lap(&mut mgr, t + 20_000);
            t += 40_000;
        }

        assert_eq!(mgr.status(t).verdict, Some(Verdict::Late));
    }

    #[test]
    fn test_mode_change_mid_arc() {
        let mut mgr = mgr(MotionMode::Task2);

        mgr.step(CROSSING, 1000);
        assert!(mgr.status(1000).arc.is_some());

        let out = mgr.set_mode(MotionMode::Task3, 3500);
        assert_eq!(out.output, PathMgrOutput::Stop(StopMode::Brake));

        let status = mgr.status(3500);
        assert_eq!(status.arc, None);
        assert_eq!(status.waypoint, Waypoint::A);
        assert_eq!(status.lap_count, 0);
        assert!(!status.completed);
    }

    #[test]
    fn test_unexpected_crossing_reanchors() {
        // Drive Task2 to D, then drop the arc by hand to model a manager
        // whose state has drifted from the course
        let mut mgr = mgr(MotionMode::Task2);
        mgr.step(CROSSING, 1000);
        mgr.step(CENTRED, 3000);
        mgr.step(CROSSING, 4000);
        mgr.arc = None;

        // D has no next crossing in the route, so a crossing here re-anchors
        // at A and keeps driving rather than stopping dead
        let out = mgr.step(CROSSING, 10_000);
        assert_eq!(out.event, Some(PathEvent::WaypointReached(Waypoint::A)));
        assert_eq!(out.output, PathMgrOutput::Track(SteerDirective::Line));
    }
}

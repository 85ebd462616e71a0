//! Simulation rig
//!
//! A software stand-in for the chassis electronics, implementing every
//! equipment trait in [`hw_if`]. The motors integrate into encoder counts
//! with a simple duty-to-speed model, and the line sensors replay a scripted
//! sequence of patterns for the selected course. The script clock only
//! advances while the wheels are actually turning, so stops and pauses hold
//! the course where it is.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
use crate::path_mgr::MotionMode;
use hw_if::eqpt::button::{ModeButtons, NUM_BUTTONS};
use hw_if::eqpt::encoder::WheelEncoders;
use hw_if::eqpt::indicator::{Colour, Indicator};
use hw_if::eqpt::line::{LineSensors, NUM_LINE_SENSORS};
use hw_if::eqpt::motor::{MotorDriver, StopMode, WheelId, NUM_WHEELS};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Duty below which the simulated motors don't turn, matching the real
/// drivetrain's stiction band.
const SIM_DEADZONE_DUTY: i16 = 2000;

/// Duty at which the simulated motors reach full speed.
const SIM_MAX_DUTY: i16 = 3600;

/// Wheel speed at full duty. Units: mm/s
const SIM_FULL_SPEED_MM_S: f64 = 1000.0;

/// Encoder counts per millimetre of wheel travel.
const SIM_COUNTS_PER_MM: f64 = 1040.0 / 204.203;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One phase of a scripted course: a sensor pattern held for a duration of
/// driving time.
#[derive(Clone, Copy, Debug)]
struct CoursePhase {
    duration_ms: u64,
    pattern: u8,
}

/// A scripted button press, in rig clock time.
#[derive(Clone, Copy, Debug)]
struct ButtonPress {
    button: usize,
    down_ms: u64,
    up_ms: u64,
}

/// The simulated chassis.
pub struct SimRig {
    /// Current duty on each wheel, zero while stopped.
    duty: [i16; NUM_WHEELS],

    /// Cumulative encoder counts, with sub-count remainders carried.
    counts: [i32; NUM_WHEELS],
    count_frac: [f64; NUM_WHEELS],

    /// Rig clock, advanced by `advance`. Units: milliseconds
    clock_ms: u64,

    /// The course script and position within it.
    course: Vec<CoursePhase>,
    course_idx: usize,
    phase_elapsed_ms: u64,

    /// Scripted button presses.
    button_script: Vec<ButtonPress>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for SimRig {
    fn default() -> Self {
        SimRig {
            duty: [0; NUM_WHEELS],
            counts: [0; NUM_WHEELS],
            count_frac: [0.0; NUM_WHEELS],
            clock_ms: 0,
            course: Vec::new(),
            course_idx: 0,
            phase_elapsed_ms: 0,
            button_script: Vec::new(),
        }
    }
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the scripted course for a task. Call when the task starts.
    pub fn begin_course(&mut self, mode: MotionMode) {
        self.course = course_for(mode);
        self.course_idx = 0;
        self.phase_elapsed_ms = 0;
    }

    /// Script a press of the given button, starting `after_ms` from now and
    /// held for `hold_ms`.
    pub fn script_button_press(&mut self, button: usize, after_ms: u64, hold_ms: u64) {
        self.button_script.push(ButtonPress {
            button,
            down_ms: self.clock_ms + after_ms,
            up_ms: self.clock_ms + after_ms + hold_ms,
        });
    }

    /// Advance the rig by one tick: integrate the motors into encoder
    /// counts, and advance the course script if the car is moving.
    pub fn advance(&mut self, dt_ms: u64) {
        self.clock_ms += dt_ms;

        let mut moving = false;
        for i in 0..NUM_WHEELS {
            let speed = duty_to_speed(self.duty[i]);
            if speed != 0.0 {
                moving = true;
            }

            self.count_frac[i] += speed * SIM_COUNTS_PER_MM * (dt_ms as f64) / 1000.0;
            let whole = self.count_frac[i].trunc();
            self.counts[i] = self.counts[i].wrapping_add(whole as i32);
            self.count_frac[i] -= whole;
        }

        if moving && self.course_idx < self.course.len() {
            self.phase_elapsed_ms += dt_ms;
            if self.phase_elapsed_ms >= self.course[self.course_idx].duration_ms {
                self.phase_elapsed_ms = 0;
                self.course_idx += 1;
            }
        }
    }

    /// True once the course script has been fully replayed.
    pub fn course_finished(&self) -> bool {
        !self.course.is_empty() && self.course_idx >= self.course.len()
    }

    fn current_pattern(&self) -> u8 {
        match self.course.get(self.course_idx) {
            Some(phase) => phase.pattern,
            // Off the end of the script the car sits on plain floor
            None => 0b0000,
        }
    }
}

impl MotorDriver for SimRig {
    fn set_duty(&mut self, wheel: WheelId, duty: i16) {
        self.duty[wheel.index()] = duty;
    }

    fn stop_all(&mut self, _mode: StopMode) {
        // Both stop modes halt instantly in the sim
        self.duty = [0; NUM_WHEELS];
    }
}

impl WheelEncoders for SimRig {
    fn read_counts(&mut self) -> [i32; NUM_WHEELS] {
        self.counts
    }
}

impl LineSensors for SimRig {
    fn read(&mut self) -> [bool; NUM_LINE_SENSORS] {
        let pattern = self.current_pattern();

        let mut readings = [false; NUM_LINE_SENSORS];
        for (i, r) in readings.iter_mut().enumerate() {
            *r = pattern & (1 << (NUM_LINE_SENSORS - 1 - i)) != 0;
        }
        readings
    }
}

impl ModeButtons for SimRig {
    fn read(&mut self) -> [bool; NUM_BUTTONS] {
        let mut pressed = [false; NUM_BUTTONS];
        for press in self.button_script.iter() {
            if self.clock_ms >= press.down_ms && self.clock_ms < press.up_ms {
                pressed[press.button] = true;
            }
        }
        pressed
    }
}

impl Indicator for SimRig {
    fn notify_waypoint(&mut self) {
        info!("[SIM] Buzz");
    }

    fn set_colour(&mut self, colour: Colour) {
        info!("[SIM] Indicator colour: {:?}", colour);
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Duty-to-speed model: dead below the stiction band, then linear up to
/// full speed at maximum duty.
fn duty_to_speed(duty: i16) -> f64 {
    let magnitude = f64::from(duty.abs());
    let deadzone = f64::from(SIM_DEADZONE_DUTY);

    if magnitude <= deadzone {
        return 0.0;
    }

    let speed = lin_map(
        (deadzone, f64::from(SIM_MAX_DUTY)),
        (0.0, SIM_FULL_SPEED_MM_S),
        magnitude,
    );

    speed.min(SIM_FULL_SPEED_MM_S) * f64::from(duty.signum())
}

/// The scripted sensor patterns for a task, start line to finish.
///
/// Legs are the centred pattern, waypoint crossings a short burst of all-on,
/// and arcs drift the line out to one side before losing it and reacquiring
/// the centre pair.
fn course_for(mode: MotionMode) -> Vec<CoursePhase> {
    let leg = |ms| CoursePhase {
        duration_ms: ms,
        pattern: 0b0110,
    };
    let crossing = CoursePhase {
        duration_ms: 200,
        pattern: 0b1111,
    };
    // An arc as seen by the sensors: the line drifts outward, disappears
    // while the car turns, then the centre pair picks it back up
    let arc = |bias: u8| {
        vec![
            CoursePhase {
                duration_ms: 600,
                pattern: bias,
            },
            CoursePhase {
                duration_ms: 1600,
                pattern: 0b0000,
            },
        ]
    };

    let mut phases = Vec::new();

    match mode {
        MotionMode::Idle => {}
        MotionMode::Task1 => {
            // The course starts at A, so the only crossing is B
            phases.push(leg(4000));
            phases.push(crossing);
            phases.push(leg(500));
        }
        MotionMode::Task2 => {
            phases.push(leg(4000));
            phases.push(crossing); // B
            phases.extend(arc(0b1000)); // left arc to C
            phases.push(leg(3000));
            phases.push(crossing); // D
            phases.extend(arc(0b0001)); // right arc home to A
            phases.push(leg(500));
        }
        MotionMode::Task3 | MotionMode::Task4 => {
            let laps = if mode == MotionMode::Task4 { 4 } else { 1 };

            for _ in 0..laps {
                phases.push(leg(4000));
                phases.push(crossing); // C
                phases.extend(arc(0b0001)); // right arc to B
                phases.push(leg(3000));
                phases.push(crossing); // D
                phases.extend(arc(0b0001)); // right arc home to A
            }
            phases.push(leg(500));
        }
    }

    phases
}

#[cfg(test)]
mod test {
    use super::*;
    use hw_if::eqpt::line::SensorStatus;

    #[test]
    fn test_duty_speed_model() {
        assert_eq!(duty_to_speed(0), 0.0);
        assert_eq!(duty_to_speed(2000), 0.0);
        assert_eq!(duty_to_speed(3600), 1000.0);
        assert_eq!(duty_to_speed(-3600), -1000.0);
        assert_eq!(duty_to_speed(2800), 500.0);
    }

    #[test]
    fn test_counts_integrate_while_driving() {
        let mut rig = SimRig::new();

        for wheel in WheelId::ALL {
            rig.set_duty(wheel, 3600);
        }

        // 1000 mm/s for 1 s is 1000 mm of travel
        for _ in 0..100 {
            rig.advance(10);
        }

        let expected = (1000.0 * SIM_COUNTS_PER_MM) as i32;
        for c in rig.read_counts() {
            assert!((c - expected).abs() <= 1);
        }
    }

    #[test]
    fn test_course_holds_while_stopped() {
        let mut rig = SimRig::new();
        rig.begin_course(MotionMode::Task1);

        // Stopped: the script must not advance
        for _ in 0..1000 {
            rig.advance(10);
        }
        assert_eq!(
            SensorStatus::from_readings(LineSensors::read(&mut rig)),
            SensorStatus(0b0110)
        );

        // Driving: the first leg runs out and the crossing appears
        for wheel in WheelId::ALL {
            rig.set_duty(wheel, 3000);
        }
        for _ in 0..400 {
            rig.advance(10);
        }
        assert_eq!(
            SensorStatus::from_readings(LineSensors::read(&mut rig)),
            SensorStatus::ALL_ON
        );
    }

    #[test]
    fn test_scripted_button_press() {
        let mut rig = SimRig::new();
        rig.script_button_press(2, 100, 600);

        assert_eq!(ModeButtons::read(&mut rig), [false; 3]);

        rig.advance(150);
        assert_eq!(ModeButtons::read(&mut rig), [false, false, true]);

        rig.advance(600);
        assert_eq!(ModeButtons::read(&mut rig), [false; 3]);
    }

    mod closed_loop {
        //! Whole-stack runs: path manager, tracker and regulator driving
        //! the rig through a scripted course.

        use super::*;
        use crate::line_track::{self, LineTrack};
        use crate::motion_ctrl::{self, MotionCtrl};
        use crate::path_mgr::{PathMgr, PathMgrOutput, PathStatus, Verdict, Waypoint};
        use hw_if::eqpt::motor::MotorDems;
        use util::module::State;

        /// Run a task over the scripted course at the real cyclic cadence,
        /// returning the final path status.
        fn run_task(mode: MotionMode, timeout_ms: u64) -> PathStatus {
            let mut rig = SimRig::new();
            let mut regulator = MotionCtrl::with_params(Default::default());
            let mut tracker = LineTrack::with_params(Default::default());
            let mut mgr = PathMgr::with_params(Default::default());

            let mut now_ms = 0u64;
            let mut cycle = 0u64;

            rig.begin_course(mode);
            match mgr.set_mode(mode, now_ms).output {
                PathMgrOutput::Stop(m) => regulator.stop(m),
                _ => panic!("mode change must stop the car"),
            }

            while !mgr.is_completed() && now_ms < timeout_ms {
                rig.advance(10);
                now_ms += 10;

                if cycle % 5 == 0 {
                    let status = SensorStatus::from_readings(LineSensors::read(&mut rig));

                    match mgr.step(status, now_ms).output {
                        PathMgrOutput::Track(directive) => {
                            let (out, _) = tracker
                                .proc(&line_track::InputData { status, directive })
                                .unwrap();
                            regulator.set_wheel_speeds(out.wheel_speeds_mm_s);
                        }
                        PathMgrOutput::Stop(m) => regulator.stop(m),
                        PathMgrOutput::None => (),
                    }
                }

                let (dems, _) = regulator
                    .proc(&motion_ctrl::InputData {
                        encoder_counts: rig.read_counts(),
                        heading_rad: None,
                    })
                    .unwrap();

                match dems {
                    MotorDems::Duty(duty) => {
                        for wheel in WheelId::ALL {
                            rig.set_duty(wheel, duty[wheel.index()]);
                        }
                    }
                    MotorDems::Stop(m) => rig.stop_all(m),
                }

                cycle += 1;
            }

            mgr.status(now_ms)
        }

        #[test]
        fn test_task1_run() {
            let status = run_task(MotionMode::Task1, 30_000);

            assert!(status.completed);
            assert_eq!(status.waypoint, Waypoint::B);
            assert_eq!(status.verdict, Some(Verdict::OnTime));
        }

        #[test]
        fn test_task2_run() {
            let status = run_task(MotionMode::Task2, 60_000);

            assert!(status.completed);
            assert_eq!(status.waypoint, Waypoint::A);
            assert_eq!(status.arc, None);
            assert_eq!(status.verdict, Some(Verdict::OnTime));
        }

        #[test]
        fn test_task4_run_counts_laps() {
            let status = run_task(MotionMode::Task4, 200_000);

            assert!(status.completed);
            assert_eq!(status.lap_count, 4);
            assert_eq!(status.waypoint, Waypoint::A);
            assert_eq!(status.verdict, Some(Verdict::OnTime));
        }
    }
}

//! Main car-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop (fixed 10 ms tick):
//!         - Rig propagation (simulated chassis)
//!         - Supervisory processing (every 5th tick):
//!             - Line sensor decode
//!             - Mode button polling
//!             - Path manager step
//!             - Line tracker processing
//!         - Motion control processing
//!         - Motor driver execution
//!
//! # Modules
//!
//! All control modules (e.g. `motion_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use car_lib::{
    data_store::DataStore,
    input::ModeSelect,
    motion_ctrl,
    path_mgr::{MotionMode, PathEvent, PathMgr, PathMgrOutput, Verdict},
    sim::SimRig,
};
use hw_if::{
    clock::{Clock, MonotonicClock},
    eqpt::button::ModeButtons,
    eqpt::indicator::{Colour, Indicator},
    eqpt::line::{LineSensors, SensorStatus},
    eqpt::motor::{MotorDems, MotorDriver, WheelId},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.01;

/// Number of regulator cycles per supervisory step.
const SUPERVISORY_DIVISOR: u128 = 5;

/// Number of cycles to keep running after task completion, letting the final
/// stop reach the motors before shutdown.
const SHUTDOWN_CYCLES: u32 = 20;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("car_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Autocar Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- TASK SELECTION ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let task = if args.len() == 2 {
        match args[1].as_str() {
            "1" => MotionMode::Task1,
            "2" => MotionMode::Task2,
            "3" => MotionMode::Task3,
            "4" => MotionMode::Task4,
            other => return Err(eyre!("Expected a task number 1-4, found {:?}", other)),
        }
    } else if args.len() == 1 {
        info!("No task argument, defaulting to task 1\n");
        MotionMode::Task1
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    };

    info!("Running {:?}", task);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.motion_ctrl
        .init("motion_ctrl.toml", &session)
        .wrap_err("Failed to initialise MotionCtrl")?;
    info!("MotionCtrl init complete");

    ds.line_track
        .init("line_track.toml", &session)
        .wrap_err("Failed to initialise LineTrack")?;
    info!("LineTrack init complete");

    let mut path_mgr = PathMgr::init("path_mgr.toml").wrap_err("Failed to initialise PathMgr")?;
    info!("PathMgr init complete");

    let mut mode_select =
        ModeSelect::init("input.toml").wrap_err("Failed to initialise ModeSelect")?;
    info!("ModeSelect init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE SIMULATION RIG ----

    let mut rig = SimRig::new();

    // Script the button press that selects the chosen task
    match task {
        MotionMode::Task1 => rig.script_button_press(0, 500, 100),
        MotionMode::Task2 => rig.script_button_press(1, 500, 100),
        MotionMode::Task3 => rig.script_button_press(2, 500, 100),
        MotionMode::Task4 => rig.script_button_press(2, 500, 700),
        MotionMode::Idle => (),
    }

    let clock = MonotonicClock::default();

    Indicator::set_colour(&mut rig, mode_colour(MotionMode::Idle));

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut shutdown_countdown: Option<u32> = None;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(SUPERVISORY_DIVISOR);

        // ---- RIG PROPAGATION ----

        rig.advance((CYCLE_PERIOD_S * 1000.0) as u64);

        let now_ms = clock.now_millis();

        // ---- SUPERVISORY PROCESSING ----

        if ds.is_supervisory_cycle {
            ds.sensor_status = SensorStatus::from_readings(LineSensors::read(&mut rig));
            trace!("Line sensors: {}", ds.sensor_status);

            // Mode button polling
            let task_active = path_mgr.mode() != MotionMode::Idle && !path_mgr.is_completed();
            let buttons = ModeButtons::read(&mut rig);

            if let Some(mode) = mode_select.poll(buttons, task_active, now_ms) {
                let out = path_mgr.set_mode(mode, now_ms);
                apply_path_output(&mut ds, out.output);

                rig.begin_course(mode);
                Indicator::set_colour(&mut rig, mode_colour(mode));
            }

            // Path manager step
            let step = path_mgr.step(ds.sensor_status, now_ms);
            apply_path_output(&mut ds, step.output);

            match step.event {
                Some(PathEvent::WaypointReached(wp)) => {
                    rig.notify_waypoint();
                    debug!("At waypoint {:?}", wp);
                }
                Some(PathEvent::LapComplete(lap)) => {
                    rig.notify_waypoint();
                    info!("Lap {} complete at {:.2} s", lap, ds.elapsed_time_s);
                }
                Some(PathEvent::TaskComplete(verdict)) => {
                    info!(
                        "Task complete at {:.2} s, verdict {:?}",
                        ds.elapsed_time_s, verdict
                    );

                    let colour = match verdict {
                        Verdict::OnTime => Colour::Green,
                        Verdict::Late => Colour::Red,
                    };
                    Indicator::set_colour(&mut rig, colour);

                    // Record the final path state in the session
                    session.save("path_status.json", path_mgr.status(now_ms));

                    shutdown_countdown = Some(SHUTDOWN_CYCLES);
                }
                None => (),
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // MotionCtrl processing
        ds.motion_ctrl_input = motion_ctrl::InputData {
            encoder_counts: hw_if::eqpt::encoder::WheelEncoders::read_counts(&mut rig),
            heading_rad: None,
        };

        match ds.motion_ctrl.proc(&ds.motion_ctrl_input) {
            Ok((o, r)) => {
                ds.motion_ctrl_output = o;
                ds.motion_ctrl_status_rpt = r;
            }
            Err(e) => {
                warn!("Error during MotionCtrl processing: {}", e);
            }
        };

        // Send demands to the motor driver
        match ds.motion_ctrl_output {
            MotorDems::Duty(duty) => {
                for wheel in WheelId::ALL {
                    rig.set_duty(wheel, duty[wheel.index()]);
                }
            }
            MotorDems::Stop(mode) => rig.stop_all(mode),
        }

        // ---- CYCLE MANAGEMENT ----

        if let Some(remaining) = shutdown_countdown {
            if remaining == 0 {
                break;
            }
            shutdown_countdown = Some(remaining - 1);
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Apply a path manager output to the motion controller.
fn apply_path_output(ds: &mut DataStore, output: PathMgrOutput) {
    match output {
        PathMgrOutput::None => (),
        PathMgrOutput::Track(directive) => {
            let input = car_lib::line_track::InputData {
                status: ds.sensor_status,
                directive,
            };

            match ds.line_track.proc(&input) {
                Ok((o, r)) => {
                    ds.line_track_status_rpt = r;
                    ds.motion_ctrl.set_wheel_speeds(o.wheel_speeds_mm_s);
                }
                Err(e) => warn!("Error during LineTrack processing: {}", e),
            }
        }
        PathMgrOutput::Stop(mode) => ds.motion_ctrl.stop(mode),
    }
}

/// Steady indicator colour for a motion mode.
fn mode_colour(mode: MotionMode) -> Colour {
    match mode {
        MotionMode::Idle => Colour::Blue,
        MotionMode::Task1 => Colour::Red,
        MotionMode::Task2 => Colour::Green,
        MotionMode::Task3 => Colour::Yellow,
        MotionMode::Task4 => Colour::Purple,
    }
}

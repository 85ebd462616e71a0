//! Implementations for the MotionCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    body_to_wheel_speeds, wheel_to_body_velocity, BodyVelocity, EncoderSampler, MotionCtrlError,
    Params, PidController, MAX_SPEED_MM_S, NUM_WHEELS,
};
use hw_if::ctrl::SpeedLoop;
use hw_if::eqpt::motor::{MotorDems, StopMode, WheelId};
use util::{maths::clamp, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion control module state
pub struct MotionCtrl {
    pub(crate) params: Params,

    report: StatusReport,

    /// Encoder now/previous snapshot
    sampler: EncoderSampler,

    /// One speed loop per wheel, in wheel order
    wheel_loops: Vec<Box<dyn SpeedLoop + Send>>,

    /// The heading trim loop
    heading_loop: Option<Box<dyn SpeedLoop + Send>>,

    /// Wheel speed targets before heading trim is applied.
    ///
    /// Units: mm/s
    base_target_mm_s: [f64; NUM_WHEELS],

    /// True while the regulator is driving the wheels, false while stopped
    regulating: bool,

    /// Stop behaviour demanded while not regulating
    stop_mode: StopMode,

    /// True if heading trim is enabled
    heading_trim: bool,

    /// Heading captured when trim first saw a heading input.
    ///
    /// Units: radians
    heading_target_rad: Option<f64>,
}

/// Input data to Motion Control, provided fresh every tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// Cumulative encoder counts sampled this tick, in wheel order.
    pub encoder_counts: [i32; NUM_WHEELS],

    /// Current heading from the external heading source, or `None` if no
    /// reading is available this tick.
    ///
    /// Units: radians
    pub heading_rad: Option<f64>,
}

/// Status report for MotionCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Wheel speed targets after trim and clamping. Units: mm/s
    pub target_mm_s: [f64; NUM_WHEELS],

    /// Wheel speeds measured from the encoder deltas. Units: mm/s
    pub measured_mm_s: [f64; NUM_WHEELS],

    /// Body velocity recovered from the measured wheel speeds
    pub measured_body: BodyVelocity,

    /// True for any wheel whose duty demand hit the platform limit
    pub duty_limited: [bool; NUM_WHEELS],

    /// True if heading trim influenced the targets this tick
    pub trim_active: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionCtrl {
    fn default() -> Self {
        MotionCtrl {
            params: Params::default(),
            report: StatusReport::default(),
            sampler: EncoderSampler::default(),
            wheel_loops: Vec::new(),
            heading_loop: None,
            base_target_mm_s: [0.0; NUM_WHEELS],
            regulating: false,
            stop_mode: StopMode::Free,
            heading_trim: false,
            heading_target_rad: None,
        }
    }
}

impl State for MotionCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = MotorDems;
    type StatusReport = StatusReport;
    type ProcError = MotionCtrlError;

    /// Initialise the MotionCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = params::load(init_data)?;

        self.build_loops();

        Ok(())
    }

    /// Perform cyclic processing of Motion Control.
    ///
    /// Must be called at the fixed tick period. Samples the encoders, runs
    /// the speed loops, and produces the duty demand for the motor driver.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Measured wheel speeds from the encoder deltas
        let deltas = self.sampler.sample(input_data.encoder_counts);
        let mm_per_count = self.params.wheel_circumference_mm / self.params.counts_per_rev;
        let ticks_per_s = 1000.0 / self.params.tick_period_ms;

        let mut measured = [0f64; NUM_WHEELS];
        for i in 0..NUM_WHEELS {
            measured[i] = deltas[i] as f64 * mm_per_count * ticks_per_s;
        }

        self.report.measured_mm_s = measured;
        self.report.measured_body =
            wheel_to_body_velocity(&measured, self.params.half_axle_span_mm);

        // While stopped keep demanding the stop, don't regulate
        if !self.regulating {
            return Ok((MotorDems::Stop(self.stop_mode), self.report));
        }

        if self.wheel_loops.len() != NUM_WHEELS {
            return Err(MotionCtrlError::LoopsNotInit);
        }

        // Apply heading trim to get this tick's targets
        let targets = self.trimmed_targets(input_data.heading_rad);
        self.report.target_mm_s = targets;

        // Run the wheel loops to get the duty demands
        let mut duty = [0i16; NUM_WHEELS];
        for i in 0..NUM_WHEELS {
            let effort = self.wheel_loops[i].update(targets[i], measured[i]);
            duty[i] = self.duty_from_effort(i, effort, targets[i]);
        }

        trace!("MotionCtrl duty: {:?}", duty);

        Ok((MotorDems::Duty(duty), self.report))
    }
}

impl MotionCtrl {
    /// Create a module with the given parameters and loops built, without
    /// touching the filesystem.
    pub fn with_params(params: Params) -> Self {
        let mut ctrl = MotionCtrl {
            params,
            ..MotionCtrl::default()
        };
        ctrl.build_loops();
        ctrl
    }

    /// Command a body-frame velocity.
    ///
    /// Each component is clamped to [-1000, 1000] mm/s before distribution.
    /// The all-zero command is a braking stop, distinct from regulating to a
    /// zero setpoint.
    pub fn set_body_velocity(&mut self, vx_mm_s: f64, vy_mm_s: f64, vz_mrad_s: f64) {
        if vx_mm_s == 0.0 && vy_mm_s == 0.0 && vz_mrad_s == 0.0 {
            self.stop(StopMode::Brake);
            return;
        }

        // Vy is accepted but the chassis cannot act on it, so only vx and vz
        // reach the wheels
        let vx = clamp(&vx_mm_s, &-MAX_SPEED_MM_S, &MAX_SPEED_MM_S);
        let vz = clamp(&vz_mrad_s, &-MAX_SPEED_MM_S, &MAX_SPEED_MM_S);

        self.set_wheel_speeds(body_to_wheel_speeds(
            vx,
            vz,
            self.params.half_axle_span_mm,
        ));
    }

    /// Command per-wheel speed targets directly, in wheel order.
    ///
    /// Each target is clamped to [-1000, 1000] mm/s.
    pub fn set_wheel_speeds(&mut self, speeds_mm_s: [f64; NUM_WHEELS]) {
        for i in 0..NUM_WHEELS {
            self.base_target_mm_s[i] = clamp(&speeds_mm_s[i], &-MAX_SPEED_MM_S, &MAX_SPEED_MM_S);
        }

        self.regulating = true;
    }

    /// Stop the car, either free-stopping or braking.
    ///
    /// Zeroes all targets and resets the loops so no stale integral survives
    /// into the next command.
    pub fn stop(&mut self, mode: StopMode) {
        self.base_target_mm_s = [0.0; NUM_WHEELS];
        self.regulating = false;
        self.stop_mode = mode;
        self.heading_trim = false;
        self.heading_target_rad = None;

        for l in self.wheel_loops.iter_mut() {
            l.reset();
        }
        if let Some(l) = self.heading_loop.as_mut() {
            l.reset();
        }
    }

    /// Enable or disable heading trim.
    ///
    /// On enable the trim target is captured from the first heading input
    /// seen by `proc`.
    pub fn set_heading_trim(&mut self, enabled: bool) {
        self.heading_trim = enabled;
        self.heading_target_rad = None;

        if let Some(l) = self.heading_loop.as_mut() {
            l.reset();
        }
    }

    /// Current wheel speed targets before trim, in wheel order.
    pub fn targets_mm_s(&self) -> [f64; NUM_WHEELS] {
        self.base_target_mm_s
    }

    /// Build the speed loops from the current parameters.
    fn build_loops(&mut self) {
        let dt_s = self.params.tick_period_ms / 1000.0;

        self.wheel_loops.clear();
        for _ in 0..NUM_WHEELS {
            self.wheel_loops.push(Box::new(PidController::new(
                self.params.wheel_k_p,
                self.params.wheel_k_i,
                self.params.wheel_k_d,
                dt_s,
            )));
        }

        self.heading_loop = Some(Box::new(PidController::new(
            self.params.heading_k_p,
            self.params.heading_k_i,
            self.params.heading_k_d,
            dt_s,
        )));
    }

    /// Apply the heading trim bias to the base targets.
    ///
    /// The correction is subtracted from the left pair and added to the
    /// right pair, each side clamped, mirroring the forward kinematics
    /// yaw split.
    fn trimmed_targets(&mut self, heading_rad: Option<f64>) -> [f64; NUM_WHEELS] {
        let heading = match (self.heading_trim, heading_rad) {
            (true, Some(h)) => h,
            _ => return self.base_target_mm_s,
        };

        let heading_loop = match self.heading_loop.as_mut() {
            Some(l) => l,
            None => return self.base_target_mm_s,
        };

        let target = *self.heading_target_rad.get_or_insert(heading);
        let offset_mm_s = heading_loop.update(target, heading);

        self.report.trim_active = true;

        let mut targets = self.base_target_mm_s;
        for wheel in WheelId::ALL {
            let i = wheel.index();
            let biased = if wheel.is_left() {
                targets[i] - offset_mm_s
            } else {
                targets[i] + offset_mm_s
            };
            targets[i] = clamp(&biased, &-MAX_SPEED_MM_S, &MAX_SPEED_MM_S);
        }

        targets
    }

    /// Convert a loop effort into a bounded duty demand.
    ///
    /// Nonzero targets always produce a nonzero duty, and the dead-zone
    /// compensation is added so that duty actually moves the wheel.
    fn duty_from_effort(&mut self, wheel: usize, effort: f64, target_mm_s: f64) -> i16 {
        let mut duty = effort.round() as i64;

        if duty == 0 && target_mm_s != 0.0 {
            duty = target_mm_s.signum() as i64;
        }

        if duty > 0 {
            duty += self.params.deadzone_duty as i64;
        } else if duty < 0 {
            duty -= self.params.deadzone_duty as i64;
        }

        let max = self.params.max_duty as i64;
        if duty > max {
            duty = max;
            self.report.duty_limited[wheel] = true;
        }
        if duty < -max {
            duty = -max;
            self.report.duty_limited[wheel] = true;
        }

        duty as i16
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ctrl() -> MotionCtrl {
        MotionCtrl::with_params(Params::default())
    }

    #[test]
    fn test_zero_body_velocity_brakes() {
        let mut mc = ctrl();

        mc.set_body_velocity(0.0, 0.0, 0.0);
        let (dems, _) = mc.proc(&InputData::default()).unwrap();

        assert_eq!(dems, MotorDems::Stop(StopMode::Brake));
    }

    #[test]
    fn test_small_nonzero_velocity_regulates() {
        let mut mc = ctrl();

        mc.set_body_velocity(1.0, 0.0, 0.0);
        let (dems, _) = mc.proc(&InputData::default()).unwrap();

        // Distinguishable from the braked stop: a duty demand is produced,
        // and the dead-zone compensation makes it large enough to move
        match dems {
            MotorDems::Duty(duty) => {
                for d in duty.iter() {
                    assert!(*d >= mc.params.deadzone_duty);
                }
            }
            other => panic!("expected duty demand, got {:?}", other),
        }
    }

    #[test]
    fn test_targets_clamped_for_extreme_commands() {
        let mut mc = ctrl();

        mc.set_body_velocity(5000.0, -3000.0, 9999.0);
        for t in mc.targets_mm_s().iter() {
            assert!(*t >= -MAX_SPEED_MM_S && *t <= MAX_SPEED_MM_S);
        }
    }

    #[test]
    fn test_duty_stays_within_platform_bounds() {
        let mut mc = ctrl();
        mc.set_wheel_speeds([1000.0, 1000.0, -1000.0, -1000.0]);

        // With no measured motion the integral winds up, the duty must still
        // be clamped every tick
        for _ in 0..200 {
            let (dems, report) = mc.proc(&InputData::default()).unwrap();
            match dems {
                MotorDems::Duty(duty) => {
                    for d in duty.iter() {
                        assert!(d.abs() <= mc.params.max_duty);
                    }
                }
                other => panic!("expected duty demand, got {:?}", other),
            }
            let _ = report;
        }
    }

    #[test]
    fn test_stop_free_vs_brake() {
        let mut mc = ctrl();

        mc.set_wheel_speeds([500.0; 4]);
        mc.stop(StopMode::Free);
        let (dems, _) = mc.proc(&InputData::default()).unwrap();
        assert_eq!(dems, MotorDems::Stop(StopMode::Free));
    }

    #[test]
    fn test_measured_speed_from_deltas() {
        let mut mc = ctrl();
        mc.set_wheel_speeds([500.0; 4]);

        // Prime the sampler
        mc.proc(&InputData::default()).unwrap();

        // 26 counts in one 10 ms tick is one rev every 400 ms, i.e.
        // 2.5 * 204.203 mm/s
        let (_, report) = mc
            .proc(&InputData {
                encoder_counts: [26; 4],
                heading_rad: None,
            })
            .unwrap();

        for m in report.measured_mm_s.iter() {
            assert!((m - 510.5075).abs() < 1e-3);
        }
    }

    #[test]
    fn test_heading_trim_biases_pairs() {
        let mut mc = ctrl();
        mc.set_wheel_speeds([500.0; 4]);
        mc.set_heading_trim(true);

        // First tick captures the trim target
        mc.proc(&InputData {
            encoder_counts: [0; 4],
            heading_rad: Some(0.1),
        })
        .unwrap();

        // Heading has drifted, the left and right pairs must split around
        // the base target
        let (_, report) = mc
            .proc(&InputData {
                encoder_counts: [0; 4],
                heading_rad: Some(0.2),
            })
            .unwrap();

        assert!(report.trim_active);
        assert!(report.target_mm_s[0] > 500.0);
        assert!(report.target_mm_s[1] > 500.0);
        assert!(report.target_mm_s[2] < 500.0);
        assert!(report.target_mm_s[3] < 500.0);
    }

    #[test]
    fn test_trim_inactive_without_heading_input() {
        let mut mc = ctrl();
        mc.set_wheel_speeds([500.0; 4]);
        mc.set_heading_trim(true);

        let (_, report) = mc.proc(&InputData::default()).unwrap();

        assert!(!report.trim_active);
        assert_eq!(report.target_mm_s, [500.0; 4]);
    }
}

//! Steering tables
//!
//! The sensor-pattern-to-steering mapping lives here as data plus two small
//! lookup functions, one for line following and one for arc driving. Sensor
//! bit 3 is the outer-left sensor and bit 0 the outer-right, so a set bit
//! means the line is towards that side and corrections steer towards it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hw_if::eqpt::line::SensorStatus;

use super::ArcDir;
use crate::motion_ctrl::NUM_WHEELS;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Steering actions for straight line following.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteerAction {
    /// Line centred, drive straight at base speed.
    Forward,

    /// Line slightly left, pivot gently left.
    NudgeLeft,

    /// Line slightly right, pivot gently right.
    NudgeRight,

    /// Line far left, spin the pairs against each other.
    SwingLeft,

    /// Line far right, spin the pairs against each other.
    SwingRight,

    /// All sensors on, drive straight across the marking.
    Intersection,

    /// All sensors off, hold the previous command.
    Hold,

    /// Contradictory pattern, creep forward until it resolves.
    Creep,
}

/// Correction cues while driving an arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcCue {
    /// Line under the centre pair, hold the nominal arc.
    Centred,

    /// Line drifting to the left sensors, tighten towards the left.
    BiasLeft,

    /// Line drifting to the right sensors, tighten towards the right.
    BiasRight,

    /// Line not visible, keep turning into the arc until it reappears.
    Lost,
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The line-following steering table.
///
/// Patterns not listed here classify as [`SteerAction::Creep`].
pub const LINE_TABLE: [(u8, SteerAction); 10] = [
    (0b0110, SteerAction::Forward),
    (0b0100, SteerAction::NudgeLeft),
    (0b1100, SteerAction::NudgeLeft),
    (0b1000, SteerAction::SwingLeft),
    (0b0010, SteerAction::NudgeRight),
    (0b0011, SteerAction::NudgeRight),
    (0b0001, SteerAction::SwingRight),
    (0b1111, SteerAction::Intersection),
    (0b0000, SteerAction::Hold),
    (0b1001, SteerAction::Creep),
];

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Classify a sensor pattern for line following.
pub fn classify_line(status: SensorStatus) -> SteerAction {
    for (pattern, action) in LINE_TABLE.iter() {
        if status.0 == *pattern {
            return *action;
        }
    }

    SteerAction::Creep
}

/// Wheel speeds for a line-following action, or `None` for a hold.
///
/// `base_mm_s` is the commanded cruise speed. Wheel order is front-left,
/// rear-left, front-right, rear-right.
pub fn action_speeds(action: SteerAction, base_mm_s: f64) -> Option<[f64; NUM_WHEELS]> {
    let b = base_mm_s;

    match action {
        SteerAction::Forward | SteerAction::Intersection => Some([b, b, b, b]),
        SteerAction::NudgeLeft => Some([0.0, 0.0, b, b]),
        SteerAction::NudgeRight => Some([b, b, 0.0, 0.0]),
        SteerAction::SwingLeft => Some([-b / 2.0, -b / 2.0, b, b]),
        SteerAction::SwingRight => Some([b, b, -b / 2.0, -b / 2.0]),
        SteerAction::Creep => Some([b / 2.0, b / 2.0, b / 2.0, b / 2.0]),
        SteerAction::Hold => None,
    }
}

/// Classify a sensor pattern for arc driving.
pub fn classify_arc(status: SensorStatus) -> ArcCue {
    match status.0 {
        0b0110 | 0b0100 | 0b0010 => ArcCue::Centred,
        0b1000 | 0b1100 => ArcCue::BiasLeft,
        0b0001 | 0b0011 => ArcCue::BiasRight,
        0b0000 => ArcCue::Lost,
        _ => ArcCue::Centred,
    }
}

/// Wheel speeds for an arc, given the correction cue.
///
/// `inner_mm_s` is the speed of the pair on the inside of the arc, and
/// `outer_mm_s` the outside pair. Corrections halve one pair to steer
/// towards the side the line has drifted to, and a lost line keeps the
/// car turning into the arc since the line curves that way.
pub fn arc_speeds(
    dir: ArcDir,
    cue: ArcCue,
    inner_mm_s: f64,
    outer_mm_s: f64,
) -> [f64; NUM_WHEELS] {
    let i = inner_mm_s;
    let o = outer_mm_s;

    match dir {
        ArcDir::Left => match cue {
            ArcCue::Centred => [i, i, o, o],
            ArcCue::BiasLeft => [i / 2.0, i / 2.0, o, o],
            ArcCue::BiasRight => [i, i, o / 2.0, o / 2.0],
            ArcCue::Lost => [i / 2.0, i / 2.0, o, o],
        },
        ArcDir::Right => match cue {
            ArcCue::Centred => [o, o, i, i],
            ArcCue::BiasRight => [o, o, i / 2.0, i / 2.0],
            ArcCue::BiasLeft => [o / 2.0, o / 2.0, i, i],
            ArcCue::Lost => [o, o, i / 2.0, i / 2.0],
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_centred_pattern_goes_forward() {
        assert_eq!(classify_line(SensorStatus(0b0110)), SteerAction::Forward);
        assert_eq!(action_speeds(SteerAction::Forward, 500.0), Some([500.0; 4]));
    }

    #[test]
    fn test_corrections_steer_towards_set_side() {
        // Line to the left: left pair slower than right pair
        for pattern in [0b0100u8, 0b1100, 0b1000] {
            let action = classify_line(SensorStatus(pattern));
            let speeds = action_speeds(action, 500.0).unwrap();
            assert!(speeds[0] < speeds[2], "pattern {:04b}", pattern);
            assert_eq!(speeds[0], speeds[1]);
            assert_eq!(speeds[2], speeds[3]);
        }

        // Line to the right: mirror image
        for pattern in [0b0010u8, 0b0011, 0b0001] {
            let action = classify_line(SensorStatus(pattern));
            let speeds = action_speeds(action, 500.0).unwrap();
            assert!(speeds[2] < speeds[0], "pattern {:04b}", pattern);
        }
    }

    #[test]
    fn test_swing_is_harder_than_nudge() {
        let nudge = action_speeds(SteerAction::NudgeLeft, 500.0).unwrap();
        let swing = action_speeds(SteerAction::SwingLeft, 500.0).unwrap();

        // A swing counter-rotates the inner pair, a nudge only stops it
        assert_eq!(nudge[0], 0.0);
        assert!(swing[0] < 0.0);
    }

    #[test]
    fn test_all_off_holds() {
        assert_eq!(classify_line(SensorStatus(0b0000)), SteerAction::Hold);
        assert_eq!(action_speeds(SteerAction::Hold, 500.0), None);
    }

    #[test]
    fn test_unlisted_patterns_creep() {
        for pattern in [0b1001u8, 0b1010, 0b0101, 0b1011] {
            assert_eq!(
                classify_line(SensorStatus(pattern)),
                SteerAction::Creep,
                "pattern {:04b}",
                pattern
            );
        }
    }

    #[test]
    fn test_arc_inner_pair_matches_direction() {
        let left = arc_speeds(ArcDir::Left, ArcCue::Centred, 300.0, 500.0);
        assert_eq!(left, [300.0, 300.0, 500.0, 500.0]);

        let right = arc_speeds(ArcDir::Right, ArcCue::Centred, 300.0, 500.0);
        assert_eq!(right, [500.0, 500.0, 300.0, 300.0]);
    }

    #[test]
    fn test_arc_lost_keeps_turning_inward() {
        // Losing the line on a left arc must yaw further left, not
        // straighten out
        let lost = arc_speeds(ArcDir::Left, ArcCue::Lost, 300.0, 500.0);
        let nominal = arc_speeds(ArcDir::Left, ArcCue::Centred, 300.0, 500.0);
        assert!(lost[0] < nominal[0]);
        assert_eq!(lost[2], nominal[2]);
    }

    #[test]
    fn test_arc_bias_corrections() {
        // Left arc, line drifting right: slow the outer pair to steer right
        let speeds = arc_speeds(ArcDir::Left, ArcCue::BiasRight, 300.0, 500.0);
        assert_eq!(speeds, [300.0, 300.0, 250.0, 250.0]);

        // Left arc, line drifting left: tighten by slowing the inner pair
        let speeds = arc_speeds(ArcDir::Left, ArcCue::BiasLeft, 300.0, 500.0);
        assert_eq!(speeds, [150.0, 150.0, 500.0, 500.0]);
    }
}

//! Route tables
//!
//! Which waypoint follows which, and where the arc segments begin and end,
//! for each task. Kept as data-shaped lookup functions so the course for a
//! task can be read off in one place.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{ArcSegment, MotionMode, Waypoint};
use crate::line_track::ArcDir;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The waypoint reached by the next line crossing, given the task and the
/// waypoint most recently passed.
///
/// Returns `None` if no further crossing is expected in this task, which
/// means the state has drifted from the course and the caller should
/// re-anchor.
pub fn next_waypoint(mode: MotionMode, current: Waypoint) -> Option<Waypoint> {
    match mode {
        MotionMode::Idle => None,
        MotionMode::Task1 => match current {
            Waypoint::A => Some(Waypoint::B),
            _ => None,
        },
        MotionMode::Task2 => match current {
            Waypoint::A => Some(Waypoint::B),
            Waypoint::C => Some(Waypoint::D),
            _ => None,
        },
        MotionMode::Task3 | MotionMode::Task4 => match current {
            Waypoint::A => Some(Waypoint::C),
            Waypoint::B => Some(Waypoint::D),
            _ => None,
        },
    }
}

/// The arc segment entered on reaching a waypoint, if any.
pub fn arc_entry(mode: MotionMode, waypoint: Waypoint) -> Option<ArcSegment> {
    match mode {
        MotionMode::Idle | MotionMode::Task1 => None,
        MotionMode::Task2 => match waypoint {
            Waypoint::B => Some(ArcSegment::Bc),
            Waypoint::D => Some(ArcSegment::Da),
            _ => None,
        },
        MotionMode::Task3 | MotionMode::Task4 => match waypoint {
            Waypoint::C => Some(ArcSegment::Cb),
            Waypoint::D => Some(ArcSegment::Da),
            _ => None,
        },
    }
}

/// The waypoint at the far end of an arc segment.
pub fn arc_exit(arc: ArcSegment) -> Waypoint {
    match arc {
        ArcSegment::Bc => Waypoint::C,
        ArcSegment::Da => Waypoint::A,
        ArcSegment::Cb => Waypoint::B,
        ArcSegment::Ad => Waypoint::D,
    }
}

/// Turn direction for an arc segment.
pub fn arc_dir(arc: ArcSegment) -> ArcDir {
    match arc {
        ArcSegment::Bc | ArcSegment::Ad => ArcDir::Left,
        ArcSegment::Da | ArcSegment::Cb => ArcDir::Right,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_task2_route() {
        // A -> B, arc to C, C -> D, arc back to A
        assert_eq!(
            next_waypoint(MotionMode::Task2, Waypoint::A),
            Some(Waypoint::B)
        );
        assert_eq!(arc_entry(MotionMode::Task2, Waypoint::B), Some(ArcSegment::Bc));
        assert_eq!(arc_exit(ArcSegment::Bc), Waypoint::C);
        assert_eq!(
            next_waypoint(MotionMode::Task2, Waypoint::C),
            Some(Waypoint::D)
        );
        assert_eq!(arc_entry(MotionMode::Task2, Waypoint::D), Some(ArcSegment::Da));
        assert_eq!(arc_exit(ArcSegment::Da), Waypoint::A);
    }

    #[test]
    fn test_task4_loop_closes() {
        // The figure-of-eight: A -> C, arc to B, B -> D, arc back to A
        let mut wp = Waypoint::A;

        wp = next_waypoint(MotionMode::Task4, wp).unwrap();
        assert_eq!(wp, Waypoint::C);
        wp = arc_exit(arc_entry(MotionMode::Task4, wp).unwrap());
        assert_eq!(wp, Waypoint::B);
        wp = next_waypoint(MotionMode::Task4, wp).unwrap();
        assert_eq!(wp, Waypoint::D);
        wp = arc_exit(arc_entry(MotionMode::Task4, wp).unwrap());
        assert_eq!(wp, Waypoint::A);
    }

    #[test]
    fn test_task1_has_no_arcs() {
        for wp in [Waypoint::A, Waypoint::B, Waypoint::C, Waypoint::D] {
            assert_eq!(arc_entry(MotionMode::Task1, wp), None);
        }
    }

    #[test]
    fn test_arc_directions() {
        assert_eq!(arc_dir(ArcSegment::Bc), ArcDir::Left);
        assert_eq!(arc_dir(ArcSegment::Cb), ArcDir::Right);
        assert_eq!(arc_dir(ArcSegment::Da), ArcDir::Right);
        assert_eq!(arc_dir(ArcSegment::Ad), ArcDir::Left);
    }
}

//! Chassis kinematics calculations
//!
//! The chassis has two axle pairs with no steerable or lateral degrees of
//! freedom, so the forward model distributes forward speed plus a yaw
//! component to the left and right pairs, and the inverse model recovers the
//! body velocity from measured wheel speeds.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::clamp;

use super::{BodyVelocity, MAX_SPEED_MM_S, NUM_WHEELS};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Distribute a body velocity over the four wheels.
///
/// The yaw component is `(vz / 1000) * half_axle_span`, added to the left
/// pair and subtracted from the right pair. Every output is clamped to
/// [-MAX_SPEED_MM_S, MAX_SPEED_MM_S].
///
/// Wheel order: front-left, rear-left, front-right, rear-right.
pub fn body_to_wheel_speeds(
    vx_mm_s: f64,
    vz_mrad_s: f64,
    half_axle_span_mm: f64,
) -> [f64; NUM_WHEELS] {
    let yaw_mm_s = (vz_mrad_s / 1000.0) * half_axle_span_mm;

    let left = clamp(&(vx_mm_s + yaw_mm_s), &-MAX_SPEED_MM_S, &MAX_SPEED_MM_S);
    let right = clamp(&(vx_mm_s - yaw_mm_s), &-MAX_SPEED_MM_S, &MAX_SPEED_MM_S);

    [left, left, right, right]
}

/// Recover the body velocity from measured wheel speeds.
///
/// The lateral component is always zero for this chassis but is kept in the
/// output so the report mirrors the command interface.
pub fn wheel_to_body_velocity(
    speeds_mm_s: &[f64; NUM_WHEELS],
    half_axle_span_mm: f64,
) -> BodyVelocity {
    let left = (speeds_mm_s[0] + speeds_mm_s[1]) / 2.0;
    let right = (speeds_mm_s[2] + speeds_mm_s[3]) / 2.0;

    BodyVelocity {
        vx_mm_s: (left + right) / 2.0,
        vy_mm_s: 0.0,
        vz_mrad_s: ((left - right) / 2.0) / half_axle_span_mm * 1000.0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const APB: f64 = 159.0;

    #[test]
    fn test_straight() {
        assert_eq!(body_to_wheel_speeds(500.0, 0.0, APB), [500.0; 4]);
    }

    #[test]
    fn test_yaw_splits_pairs() {
        let speeds = body_to_wheel_speeds(500.0, 1000.0, APB);

        // 1000 mrad/s over a 159 mm moment arm is a 159 mm/s split
        assert_eq!(speeds, [659.0, 659.0, 341.0, 341.0]);
    }

    #[test]
    fn test_targets_always_in_range() {
        for vx in [-2000.0, -1000.0, 0.0, 999.0, 5000.0] {
            for vz in [-3000.0, -1.0, 0.0, 1000.0, 9000.0] {
                for s in body_to_wheel_speeds(vx, vz, APB) {
                    assert!(s >= -MAX_SPEED_MM_S && s <= MAX_SPEED_MM_S);
                }
            }
        }
    }

    #[test]
    fn test_inverse_recovers_body() {
        let speeds = body_to_wheel_speeds(300.0, 400.0, APB);
        let body = wheel_to_body_velocity(&speeds, APB);

        assert!((body.vx_mm_s - 300.0).abs() < 1e-9);
        assert!((body.vz_mrad_s - 400.0).abs() < 1e-9);
        assert_eq!(body.vy_mm_s, 0.0);
    }
}

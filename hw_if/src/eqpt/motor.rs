//! # Motor Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of driven wheels on the chassis.
pub const NUM_WHEELS: usize = 4;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the four wheel actuators.
///
/// The discriminant is the index into every per-wheel array in the software,
/// so the wheel ordering is fixed in one place.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum WheelId {
    FrontLeft = 0,
    RearLeft = 1,
    FrontRight = 2,
    RearRight = 3,
}

/// Stop mode for the motor driver, either coasting to a halt or actively
/// braking.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum StopMode {
    Free,
    Brake,
}

/// Demands that are issued to the motor driver each regulator tick.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum MotorDems {
    /// Signed PWM duty per wheel, in wheel order.
    Duty([i16; NUM_WHEELS]),

    /// Stop all wheels.
    Stop(StopMode),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The motor driver collaborator.
///
/// Implementors own the PWM peripherals. Duty sign gives direction, and the
/// magnitude is expected to already include any dead-zone compensation.
pub trait MotorDriver {
    /// Set the signed duty for a single wheel.
    fn set_duty(&mut self, wheel: WheelId, duty: i16);

    /// Stop all wheels in the given mode.
    fn stop_all(&mut self, mode: StopMode);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WheelId {
    /// All wheels in array order.
    pub const ALL: [WheelId; NUM_WHEELS] = [
        WheelId::FrontLeft,
        WheelId::RearLeft,
        WheelId::FrontRight,
        WheelId::RearRight,
    ];

    /// Index of this wheel into per-wheel arrays.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// True for the left-hand axle pair.
    pub fn is_left(&self) -> bool {
        matches!(self, WheelId::FrontLeft | WheelId::RearLeft)
    }
}

impl Default for MotorDems {
    fn default() -> Self {
        MotorDems::Stop(StopMode::Free)
    }
}

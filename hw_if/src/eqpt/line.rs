//! # Line sensor array interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of line sensors in the array.
pub const NUM_LINE_SENSORS: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The packed status of the 4-element line sensor array.
///
/// Bit 3 is the outer-left sensor, bit 0 the outer-right, so the mask reads
/// left-to-right like the array itself. A set bit means that sensor sees the
/// line.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Copy, Clone, Hash)]
pub struct SensorStatus(pub u8);

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The line sensor array collaborator.
pub trait LineSensors {
    /// Read all sensors, left to right. `true` means on the line.
    fn read(&mut self) -> [bool; NUM_LINE_SENSORS];
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SensorStatus {
    /// Every sensor sees the line, the intersection/waypoint pattern.
    pub const ALL_ON: SensorStatus = SensorStatus(0b1111);

    /// Both centre sensors see the line, the centred pattern.
    pub const CENTRE_PAIR: SensorStatus = SensorStatus(0b0110);

    /// Pack raw readings into a status mask.
    pub fn from_readings(readings: [bool; NUM_LINE_SENSORS]) -> Self {
        let mut status = 0u8;

        for (i, on) in readings.iter().enumerate() {
            if *on {
                status |= 1 << (NUM_LINE_SENSORS - 1 - i);
            }
        }

        SensorStatus(status)
    }

    /// True if every sensor sees the line.
    pub fn is_all_on(&self) -> bool {
        *self == Self::ALL_ON
    }

    /// True if both centre sensors see the line, regardless of the outer
    /// sensors. Used to detect centreline reacquisition after an arc.
    pub fn centre_reacquired(&self) -> bool {
        self.0 & Self::CENTRE_PAIR.0 == Self::CENTRE_PAIR.0
    }
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pack_order() {
        assert_eq!(
            SensorStatus::from_readings([true, false, false, false]),
            SensorStatus(0b1000)
        );
        assert_eq!(
            SensorStatus::from_readings([false, true, true, false]),
            SensorStatus::CENTRE_PAIR
        );
        assert_eq!(
            SensorStatus::from_readings([true, true, true, true]),
            SensorStatus::ALL_ON
        );
    }

    #[test]
    fn test_centre_reacquired() {
        assert!(SensorStatus(0b0110).centre_reacquired());
        assert!(SensorStatus(0b1111).centre_reacquired());
        assert!(!SensorStatus(0b0100).centre_reacquired());
        assert!(!SensorStatus(0b1001).centre_reacquired());
    }
}

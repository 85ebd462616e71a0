//! # Quadrature encoder interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::motor::NUM_WHEELS;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The wheel encoder collaborator.
///
/// Counts are cumulative and signed, one per wheel in wheel order. The counter
/// peripherals are free-running, so consumers must difference successive
/// readings themselves.
pub trait WheelEncoders {
    /// Read the current cumulative count of each encoder.
    fn read_counts(&mut self) -> [i32; NUM_WHEELS];
}

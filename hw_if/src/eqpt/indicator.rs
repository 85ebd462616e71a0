//! # Buzzer/RGB indicator interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Colours the RGB indicator can display.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum Colour {
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The buzzer/RGB indicator collaborator.
///
/// Both operations are fire-and-forget: the control software never waits on
/// the indicator and ignores whether anything is actually attached.
pub trait Indicator {
    /// Signal arrival at a course waypoint (short buzz).
    fn notify_waypoint(&mut self);

    /// Set the steady indicator colour.
    fn set_colour(&mut self, colour: Colour);
}

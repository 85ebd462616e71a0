//! # Mode-select button interface

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of mode-select buttons.
pub const NUM_BUTTONS: usize = 3;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The mode-select button collaborator.
///
/// Readings are already hardware-debounced; `true` means currently pressed.
/// Press-duration logic (short vs long press) lives in the supervisor, not
/// here.
pub trait ModeButtons {
    /// Read the current pressed state of each button.
    fn read(&mut self) -> [bool; NUM_BUTTONS];
}

//! # Car library.
//!
//! This library allows other crates in the workspace, and the binary itself,
//! to access the control modules of the car software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store - owns all module state shared between the execution contexts
pub mod data_store;

/// Mode-select input module - non-blocking button polling and long-press detection
pub mod input;

/// Line tracking module - maps sensor patterns to wheel-speed commands
pub mod line_track;

/// Motion control module - converts body velocities into regulated per-wheel duties
pub mod motion_ctrl;

/// Path manager module - the mode/waypoint/arc state machine sequencing the course
pub mod path_mgr;

/// Simulation rig - in-process implementation of the hardware interfaces
pub mod sim;

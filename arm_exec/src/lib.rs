//! # Arm library.
//!
//! This library allows other crates in the workspace, and the tests, to access items defined
//! inside the arm executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - validates servo commands and converges servos onto their targets
pub mod arm_ctrl;

/// Servo control - converts angles into pulses and drives the servo driver board
pub mod servo_ctrl;

/// Arm server - recieves telecommands and publishes telemetry
pub mod arm_server;

/// Telecommand processor - routes telecommands to the arm controller
pub mod tc_processor;

/// Parameters for the arm executable
pub mod params;

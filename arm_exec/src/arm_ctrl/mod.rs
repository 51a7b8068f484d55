//! Arm control module
//!
//! Owns the arm's servos, validates servo commands and steps every servo towards its demanded
//! angle on a fixed cadence.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod clock;
mod params;
mod registry;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use clock::*;
pub use params::*;
pub use registry::*;
pub use state::*;

use crate::servo_ctrl::ServoError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a servo command is rejected.
///
/// A rejected command never modifies the state of any servo.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArmCmdError {
    #[error("Command has no payload")]
    NullPayload,

    #[error("Command payload is not a JSON object")]
    PayloadNotObject,

    #[error("No servo name field")]
    NoNameField,

    #[error("Servo name field is not a string")]
    NameNotString,

    #[error("Wrong servo name ({0})")]
    UnknownServo(String),

    #[error("No angle field")]
    NoAngleField,

    #[error("Angle field is not an integer")]
    AngleNotInteger,

    #[error("Angle {angle} out of range for servo {servo} ([{min}, {max}])")]
    AngleOutOfRange {
        servo: String,
        angle: i64,
        min: u8,
        max: u8,
    },

    #[error("Arm control is not operational")]
    NotOperational,
}

/// Errors which can occur while initialising ArmCtrl.
///
/// After any of these the controller is not operational.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(ParamsError),

    #[error("Could not bring up the bus: {0}")]
    BusInit(ServoError),

    #[error("Could not initialise the pulse output: {0}")]
    PulseInit(ServoError),

    #[error("Could not park servo {0}: {1}")]
    ParkFailed(String, ServoError),
}

/// Errors which can occur during cyclic processing of ArmCtrl.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    #[error("Arm control has not been initialised")]
    NotOperational,
}

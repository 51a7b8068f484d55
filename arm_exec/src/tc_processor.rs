//! # Telecommand processor module
//!
//! The telecommand processor executes TCs recieved by the server and builds the response owed
//! for each of them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use crate::arm_ctrl::{ArmCtrl, Clock, InputData};
use crate::servo_ctrl::PulseOutput;
use comms_if::tc::{Tc, TcParseError, TcResponse};
use util::module::State;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Servo commands are passed to arm control, which may also perform a
/// convergence step if one is due.
pub fn exec<O, C>(arm: &mut ArmCtrl<O, C>, tc: &Tc) -> TcResponse
where
    O: PulseOutput,
    C: Clock,
{
    match tc {
        Tc::Heartbeat => {
            debug!("Recieved Heartbeat");
            TcResponse::Ok
        }
        Tc::Snapshot => {
            debug!("Recieved Snapshot request");
            TcResponse::Snapshot(arm.snapshot())
        }
        Tc::Arm(cmd) => {
            debug!("Recieved {} command", cmd.kind);

            let input = InputData {
                cmd: Some(cmd.clone()),
            };

            match arm.proc(&input) {
                Ok((output, _)) => match output.cmd_result {
                    Some(Err(e)) => TcResponse::Rejected(e.to_string()),
                    _ => TcResponse::Ok,
                },
                Err(e) => {
                    warn!("Error during ArmCtrl processing: {}", e);
                    TcResponse::Rejected(e.to_string())
                }
            }
        }
    }
}

/// Response owed for a TC which could not be parsed.
pub fn parse_error_response(error: &TcParseError) -> TcResponse {
    TcResponse::Invalid(error.to_string())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.
//!
//! A telecommand is a JSON object of the form
//! `{"type": "<identifier>", "payload": {...}}`. The payload is optional for
//! every type, validation of its content is left to the module executing it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, json, Value};
use thiserror::Error;

// Internal
use crate::eqpt::arm::ArmData;
use arm_ctrl::{ArmCmd, ArmCmdKind};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Field holding the telecommand's type identifier.
pub const TYPE_KEY: &str = "type";

/// Field holding the telecommand's payload.
pub const PAYLOAD_KEY: &str = "payload";

/// Type identifier of the heartbeat telecommand.
pub const HEARTBEAT_TYPE: &str = "heartbeat";

/// Type identifier of the snapshot request telecommand.
pub const SNAPSHOT_TYPE: &str = "snapshot";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the arm by an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Tc {
    /// Keep-alive from the operator, always acknowledged.
    Heartbeat,

    /// Request a snapshot of the arm's servos in the response.
    Snapshot,

    /// Command for a single servo.
    Arm(ArmCmd),
}

/// Response sent back for every telecommand received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TcResponse {
    /// The telecommand was accepted.
    Ok,

    /// The telecommand was well formed but was rejected by the module
    /// executing it. State has not been modified.
    Rejected(String),

    /// The telecommand could not be parsed.
    Invalid(String),

    /// Snapshot of the arm, sent in reply to [`Tc::Snapshot`].
    Snapshot(ArmData),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let val: Value = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        let tc_type = match val.get(TYPE_KEY).and_then(Value::as_str) {
            Some(s) => s,
            None => {
                return Err(TcParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        match tc_type {
            HEARTBEAT_TYPE => Ok(Tc::Heartbeat),
            SNAPSHOT_TYPE => Ok(Tc::Snapshot),
            t => match ArmCmdKind::from_str(t) {
                Some(kind) => Ok(Tc::Arm(ArmCmd {
                    kind,
                    // Null payloads are forwarded as missing, arm control
                    // reports them itself
                    payload: match val.get(PAYLOAD_KEY) {
                        None | Some(Value::Null) => None,
                        Some(p) => Some(p.clone()),
                    },
                })),
                None => Err(TcParseError::InvalidType(format!(
                    "{} is not a recognised TC type",
                    t
                ))),
            },
        }
    }

    /// Serialise this TC into its JSON packet.
    pub fn to_json(&self) -> String {
        let val = match self {
            Tc::Heartbeat => json!({ TYPE_KEY: HEARTBEAT_TYPE }),
            Tc::Snapshot => json!({ TYPE_KEY: SNAPSHOT_TYPE }),
            Tc::Arm(cmd) => json!({
                TYPE_KEY: cmd.kind.as_str(),
                PAYLOAD_KEY: cmd.payload.clone().unwrap_or(Value::Null),
            }),
        };

        val.to_string()
    }
}

impl TcResponse {
    /// Parse a response from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise this response into a JSON packet.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

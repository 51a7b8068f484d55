//! # Arm control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Payload field holding the name of the servo a command targets.
pub const NAME_KEY: &str = "name";

/// Payload field holding the demanded angle of a `servo_angle` command.
pub const ANGLE_KEY: &str = "angle";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A command for a single servo on the arm.
///
/// The payload is kept as raw JSON, it is the arm controller's job to validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmCmd {
    /// Which command to execute
    pub kind: ArmCmdKind,

    /// The command's payload, `None` if the TC carried no payload or a `null` one.
    pub payload: Option<Value>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The closed set of commands understood by arm control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmCmdKind {
    /// Drive the servo towards its minimum angle.
    ServoMinus,

    /// Drive the servo towards its maximum angle.
    ServoPlus,

    /// Stop the servo where it currently is.
    ServoStop,

    /// Drive the servo towards the angle given in the payload.
    ServoAngle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmCmd {
    /// Build a command targetting the servo `name`.
    pub fn new(kind: ArmCmdKind, name: &str) -> Self {
        let mut payload = serde_json::Map::new();
        payload.insert(NAME_KEY.into(), Value::from(name));

        Self {
            kind,
            payload: Some(Value::Object(payload)),
        }
    }

    /// Build a `servo_angle` command targetting the servo `name`.
    pub fn angle(name: &str, angle: i64) -> Self {
        let mut cmd = Self::new(ArmCmdKind::ServoAngle, name);
        if let Some(Value::Object(ref mut p)) = cmd.payload {
            p.insert(ANGLE_KEY.into(), Value::from(angle));
        }
        cmd
    }
}

impl ArmCmdKind {
    /// Every command kind, in wire order.
    pub const ALL: [ArmCmdKind; 4] = [
        ArmCmdKind::ServoMinus,
        ArmCmdKind::ServoPlus,
        ArmCmdKind::ServoStop,
        ArmCmdKind::ServoAngle,
    ];

    /// The identifier used for this command on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArmCmdKind::ServoMinus => "servo_minus",
            ArmCmdKind::ServoPlus => "servo_plus",
            ArmCmdKind::ServoStop => "servo_stop",
            ArmCmdKind::ServoAngle => "servo_angle",
        }
    }

    /// Parse a wire identifier, returning `None` if it isn't an arm command.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for ArmCmdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

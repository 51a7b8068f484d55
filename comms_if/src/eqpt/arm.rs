//! # Arm Telemetry
//!
//! Snapshot of every servo on the arm, published periodically by the arm executable and returned
//! in response to a snapshot request.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Point-in-time report of all servos owned by a controller.
///
/// Serialises as `{"name": "arm", "data": [{"servo": "wrist", "min": 0, "max": 180, "angle": 90}]}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ArmData {
    /// Name of the controller which produced this report
    pub name: String,

    /// One entry per servo, in registry order
    pub data: Vec<ServoData>,
}

/// The state of a single servo within an [`ArmData`] report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServoData {
    /// Name of the servo
    pub servo: String,

    /// Lower angular bound, degrees
    pub min: u8,

    /// Upper angular bound, degrees
    pub max: u8,

    /// Current angle, degrees
    pub angle: u8,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmData {
    /// Find the entry for the servo with the given name.
    pub fn servo(&self, name: &str) -> Option<&ServoData> {
        self.data.iter().find(|s| s.servo == name)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arm_data_layout() {
        let data = ArmData {
            name: String::from("arm"),
            data: vec![ServoData {
                servo: String::from("wrist"),
                min: 0,
                max: 180,
                angle: 90,
            }],
        };

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "name": "arm",
                "data": [{"servo": "wrist", "min": 0, "max": 180, "angle": 90}]
            })
        );

        assert_eq!(data.servo("wrist").map(|s| s.angle), Some(90));
        assert!(data.servo("elbow").is_none());
    }
}

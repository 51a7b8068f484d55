//! # Arm Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::arm_ctrl;
use comms_if::net::NetParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ArmExecParams {
    /// Endpoints of the server's sockets
    pub net: NetParams,

    /// Time between two telemetry snapshots
    ///
    /// Units: milliseconds
    pub telemetry_period_ms: u32,

    /// Servo driver board connection
    pub driver: DriverParams,

    /// Arm control parameters
    pub arm: arm_ctrl::Params,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverParams {
    /// Raspberry Pi I2C bus the PCA9685 is attached to
    pub i2c_bus: u8,

    /// I2C address of the PCA9685
    pub pca9685_address: u8,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_exec_params() {
        let params: ArmExecParams = util::params::from_str(
            r#"
            telemetry_period_ms = 500

            [net]
            tc_endpoint = "tcp://*:5020"
            tm_endpoint = "tcp://*:5021"

            [driver]
            i2c_bus = 1
            pca9685_address = 0x40

            [arm]
            update_period_ms = 20

            [arm.pulse]
            pulse_min_us = 500
            pulse_max_us = 2500
            frequency_hz = 50.0

            [[arm.servos]]
            name = "wrist"
            min_angle = 0
            max_angle = 180
            channel = 3
            initial_angle = 90
            "#,
        )
        .unwrap();

        assert_eq!(params.net.tc_endpoint, "tcp://*:5020");
        assert_eq!(params.driver.pca9685_address, 0x40);
        assert_eq!(params.arm.name, "arm");
        assert_eq!(params.arm.servos.len(), 1);
        assert!(params.arm.are_valid().is_ok());
    }

    #[test]
    fn test_shipped_params_are_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("params")
            .join("arm_exec.toml");

        let params: ArmExecParams = util::params::load_from_path(path).unwrap();

        assert_eq!(params.arm.are_valid(), Ok(()));
        assert_eq!(params.arm.servos.len(), 5);
    }
}

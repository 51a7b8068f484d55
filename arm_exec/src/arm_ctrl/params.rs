//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::servo_ctrl::{PulseParams, DOMAIN_MAX_ANGLE, NUM_CHANNELS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Name of the controller, reported in snapshots.
    #[serde(default = "default_name")]
    pub name: String,

    /// Minimum time between two convergence steps.
    ///
    /// Units: milliseconds
    pub update_period_ms: u32,

    /// Pulse generation parameters shared by all servos.
    pub pulse: PulseParams,

    /// The servos on the arm, in registry order.
    pub servos: Vec<ServoParams>,
}

/// Static description of one servo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServoParams {
    /// Unique name commands use to address the servo.
    pub name: String,

    /// Lowest angle the servo may be commanded to.
    ///
    /// Units: degrees
    pub min_angle: u8,

    /// Highest angle the servo may be commanded to.
    ///
    /// Units: degrees
    pub max_angle: u8,

    /// Driver board channel the servo is wired to.
    pub channel: u8,

    /// Angle the servo is parked at on initialisation.
    ///
    /// Units: degrees
    pub initial_angle: u8,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("No servos are defined")]
    NoServos,

    #[error("{0} servos are defined but a driver board only has {} channels", NUM_CHANNELS)]
    TooManyServos(usize),

    #[error("Servo {0} has an empty name")]
    EmptyName(usize),

    #[error("Servo name {0} is used more than once")]
    NonUniqueName(String),

    #[error("Servo {0} is on channel {1} which does not exist")]
    InvalidChannel(String, u8),

    #[error("Channel {0} is used by more than one servo")]
    NonUniqueChannel(u8),

    #[error("Servo {0} has invalid bounds [{1}, {2}]")]
    InvalidBounds(String, u8, u8),

    #[error("Servo {0} has an initial angle ({1}) outside its bounds")]
    InitialAngleOutOfBounds(String, u8),

    #[error("Pulse frequency must be positive, found {0}")]
    InvalidFrequency(f64),

    #[error("Pulse widths [{0}, {1}] us do not fit in the pulse period")]
    InvalidPulseWidth(u16, u16),

    #[error("Update period must be non-zero")]
    ZeroUpdatePeriod,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if self.update_period_ms == 0 {
            return Err(ParamsError::ZeroUpdatePeriod);
        }

        let freq = self.pulse.frequency_hz;
        if !freq.is_finite() || freq <= 0.0 {
            return Err(ParamsError::InvalidFrequency(freq));
        }

        let period_us = 1_000_000.0 / freq;
        if self.pulse.pulse_min_us as f64 >= period_us || self.pulse.pulse_max_us as f64 >= period_us
        {
            return Err(ParamsError::InvalidPulseWidth(
                self.pulse.pulse_min_us,
                self.pulse.pulse_max_us,
            ));
        }

        if self.servos.is_empty() {
            return Err(ParamsError::NoServos);
        }
        if self.servos.len() > NUM_CHANNELS as usize {
            return Err(ParamsError::TooManyServos(self.servos.len()));
        }

        for (i, servo) in self.servos.iter().enumerate() {
            if servo.name.is_empty() {
                return Err(ParamsError::EmptyName(i));
            }

            if self.servos[..i].iter().any(|s| s.name == servo.name) {
                return Err(ParamsError::NonUniqueName(servo.name.clone()));
            }

            if servo.channel >= NUM_CHANNELS {
                return Err(ParamsError::InvalidChannel(
                    servo.name.clone(),
                    servo.channel,
                ));
            }

            if self.servos[..i].iter().any(|s| s.channel == servo.channel) {
                return Err(ParamsError::NonUniqueChannel(servo.channel));
            }

            if servo.min_angle > servo.max_angle || servo.max_angle > DOMAIN_MAX_ANGLE {
                return Err(ParamsError::InvalidBounds(
                    servo.name.clone(),
                    servo.min_angle,
                    servo.max_angle,
                ));
            }

            if servo.initial_angle < servo.min_angle || servo.initial_angle > servo.max_angle {
                return Err(ParamsError::InitialAngleOutOfBounds(
                    servo.name.clone(),
                    servo.initial_angle,
                ));
            }
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            name: default_name(),
            update_period_ms: 20,
            pulse: PulseParams::default(),
            servos: Vec::new(),
        }
    }
}

fn default_name() -> String {
    String::from("arm")
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn servo(name: &str, channel: u8) -> ServoParams {
        ServoParams {
            name: name.into(),
            min_angle: 10,
            max_angle: 170,
            channel,
            initial_angle: 90,
        }
    }

    fn params() -> Params {
        Params {
            servos: vec![servo("base", 0), servo("wrist", 1)],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid() {
        assert_eq!(params().are_valid(), Ok(()));
    }

    #[test]
    fn test_from_toml() {
        let p: Params = util::params::from_str(
            r#"
            update_period_ms = 15

            [pulse]
            pulse_min_us = 600
            pulse_max_us = 2400
            frequency_hz = 50.0

            [[servos]]
            name = "wrist"
            min_angle = 0
            max_angle = 180
            channel = 4
            initial_angle = 90
            "#,
        )
        .unwrap();

        assert_eq!(p.name, "arm");
        assert_eq!(p.update_period_ms, 15);
        assert_eq!(p.pulse.pulse_min_us, 600);
        assert_eq!(p.servos.len(), 1);
        assert_eq!(p.servos[0].channel, 4);
        assert_eq!(p.are_valid(), Ok(()));
    }

    #[test]
    fn test_invalid_servos() {
        let mut p = params();
        p.servos.clear();
        assert_eq!(p.are_valid(), Err(ParamsError::NoServos));

        let mut p = params();
        p.servos[1].name = "base".into();
        assert_eq!(p.are_valid(), Err(ParamsError::NonUniqueName("base".into())));

        let mut p = params();
        p.servos[1].name.clear();
        assert_eq!(p.are_valid(), Err(ParamsError::EmptyName(1)));

        let mut p = params();
        p.servos[1].channel = 0;
        assert_eq!(p.are_valid(), Err(ParamsError::NonUniqueChannel(0)));

        let mut p = params();
        p.servos[0].channel = 16;
        assert_eq!(
            p.are_valid(),
            Err(ParamsError::InvalidChannel("base".into(), 16))
        );

        let mut p = params();
        p.servos[0].min_angle = 100;
        p.servos[0].max_angle = 50;
        assert_eq!(
            p.are_valid(),
            Err(ParamsError::InvalidBounds("base".into(), 100, 50))
        );

        let mut p = params();
        p.servos[0].max_angle = 200;
        assert_eq!(
            p.are_valid(),
            Err(ParamsError::InvalidBounds("base".into(), 10, 200))
        );

        let mut p = params();
        p.servos[0].initial_angle = 5;
        assert_eq!(
            p.are_valid(),
            Err(ParamsError::InitialAngleOutOfBounds("base".into(), 5))
        );

        let mut p = params();
        p.servos = (0..17).map(|i| servo(&format!("s{}", i), i)).collect();
        assert_eq!(p.are_valid(), Err(ParamsError::TooManyServos(17)));
    }

    #[test]
    fn test_invalid_timing() {
        let mut p = params();
        p.update_period_ms = 0;
        assert_eq!(p.are_valid(), Err(ParamsError::ZeroUpdatePeriod));

        let mut p = params();
        p.pulse.frequency_hz = 0.0;
        assert_eq!(p.are_valid(), Err(ParamsError::InvalidFrequency(0.0)));

        // 500 Hz has a 2000 us period
        let mut p = params();
        p.pulse.frequency_hz = 500.0;
        assert_eq!(p.are_valid(), Err(ParamsError::InvalidPulseWidth(500, 2500)));
    }
}

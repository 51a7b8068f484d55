//! # Servo Controller Module
//!
//! This module provides a unified pulse output interface which can abstract over different types
//! of servo driver boards, along with the conversion from servo angles into the pulse widths those
//! boards understand.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`PulseOutput`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

/// Simulated [`PulseOutput`] used when no driver board is attached.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of steps in one PWM cycle of the driver board.
pub const PWM_RESOLUTION: u16 = 4096;

/// Largest tick count which can be written to a channel.
pub const MAX_TICKS: u16 = PWM_RESOLUTION - 1;

/// Number of output channels on one driver board.
pub const NUM_CHANNELS: u8 = 16;

/// Lowest angle of the servo domain, degrees.
pub const DOMAIN_MIN_ANGLE: u8 = 0;

/// Highest angle of the servo domain, degrees.
pub const DOMAIN_MAX_ANGLE: u8 = 180;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The communication bus a driver board sits on.
pub trait Bus {
    /// Bring the bus up. Must succeed before any pulse is output.
    fn begin(&mut self) -> Result<(), ServoError>;
}

/// Trait to provide a unified API for accessing servo driver boards.
pub trait PulseOutput: Bus {
    /// Configure the frequency of the pulses output on every channel.
    fn init(&mut self, frequency_hz: f64) -> Result<(), ServoError>;

    /// Set the pulse output on a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to set the pulse on
    /// - `phase` - Tick within the cycle at which the pulse starts
    /// - `ticks` - Width of the pulse in ticks, must be less than [`PWM_RESOLUTION`]
    fn set_pulse(&mut self, channel: u8, phase: u16, ticks: u16) -> Result<(), ServoError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pulse widths driving the servos and the frequency they are repeated at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseParams {
    /// Width of the pulse at [`DOMAIN_MIN_ANGLE`]
    ///
    /// Units: microseconds
    pub pulse_min_us: u16,

    /// Width of the pulse at [`DOMAIN_MAX_ANGLE`]
    ///
    /// Units: microseconds
    pub pulse_max_us: u16,

    /// Pulse repetition frequency
    ///
    /// Units: hertz
    pub frequency_hz: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Channel {0} does not exist on the driver board")]
    InvalidChannel(u8),

    #[error("Pulse width of {0} ticks is longer than a full cycle")]
    InvalidTicks(u16),

    #[error("Pulse frequency of {0} Hz cannot be generated")]
    InvalidFrequency(f64),

    #[error("Could not bring up the bus: {0}")]
    BusInit(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PulseParams {
    /// Duration of a single tick of the driver board.
    ///
    /// Units: microseconds
    pub fn tick_length_us(&self) -> f64 {
        1_000_000.0 / (self.frequency_hz * PWM_RESOLUTION as f64)
    }

    /// Linearly map an angle in the servo domain onto a pulse width in microseconds.
    ///
    /// Integer arithmetic is used throughout, so the result is truncated towards the minimum
    /// pulse width.
    pub fn angle_to_pulse_us(&self, angle: u8) -> u16 {
        let angle = angle.min(DOMAIN_MAX_ANGLE) as i32;
        let min = self.pulse_min_us as i32;
        let max = self.pulse_max_us as i32;

        let us = (angle - DOMAIN_MIN_ANGLE as i32) * (max - min)
            / (DOMAIN_MAX_ANGLE - DOMAIN_MIN_ANGLE) as i32
            + min;

        us.max(0).min(u16::MAX as i32) as u16
    }

    /// Convert a pulse width in microseconds into driver board ticks.
    pub fn pulse_us_to_ticks(&self, pulse_us: u16) -> u16 {
        let ticks = pulse_us as f64 / self.tick_length_us();

        if ticks >= MAX_TICKS as f64 {
            MAX_TICKS
        } else {
            ticks as u16
        }
    }

    /// Convert an angle in the servo domain into driver board ticks.
    pub fn angle_to_ticks(&self, angle: u8) -> u16 {
        self.pulse_us_to_ticks(self.angle_to_pulse_us(angle))
    }
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            pulse_min_us: 500,
            pulse_max_us: 2500,
            frequency_hz: 50.0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_angle_to_pulse_us() {
        let p = PulseParams::default();

        assert_eq!(p.angle_to_pulse_us(0), 500);
        assert_eq!(p.angle_to_pulse_us(90), 1500);
        assert_eq!(p.angle_to_pulse_us(180), 2500);

        // 2000 * 1 / 180 = 11.1 truncated
        assert_eq!(p.angle_to_pulse_us(1), 511);

        // Angles outside the domain saturate
        assert_eq!(p.angle_to_pulse_us(255), 2500);
    }

    #[test]
    fn test_angle_to_pulse_us_reversed() {
        let p = PulseParams {
            pulse_min_us: 2400,
            pulse_max_us: 600,
            frequency_hz: 50.0,
        };

        assert_eq!(p.angle_to_pulse_us(0), 2400);
        assert_eq!(p.angle_to_pulse_us(90), 1500);
        assert_eq!(p.angle_to_pulse_us(180), 600);
    }

    #[test]
    fn test_pulse_us_to_ticks() {
        let p = PulseParams::default();

        // 50 Hz over 4096 steps is 4.8828125 us per tick
        assert_eq!(p.tick_length_us(), 4.8828125);
        assert_eq!(p.pulse_us_to_ticks(500), 102);
        assert_eq!(p.pulse_us_to_ticks(1500), 307);
        assert_eq!(p.pulse_us_to_ticks(2500), 512);
        assert_eq!(p.pulse_us_to_ticks(0), 0);

        // A pulse longer than the period is capped to a full cycle
        assert_eq!(p.pulse_us_to_ticks(u16::MAX), MAX_TICKS);
    }

    #[test]
    fn test_angle_to_ticks_is_monotonic() {
        let p = PulseParams::default();

        let mut last = p.angle_to_ticks(0);
        for angle in 1..=DOMAIN_MAX_ANGLE {
            let ticks = p.angle_to_ticks(angle);
            assert!(ticks >= last);
            assert!(ticks <= MAX_TICKS);
            last = ticks;
        }

        assert_eq!(p.angle_to_ticks(90), 307);
    }
}

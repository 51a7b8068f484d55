//! Simulated pulse output
//!
//! Records every pulse it is asked to output instead of driving hardware. Used on hosts with no
//! driver board attached and throughout the tests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use super::{Bus, PulseOutput, ServoError, MAX_TICKS, NUM_CHANNELS};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pulse output which logs and records pulses rather than generating them.
#[derive(Debug, Default)]
pub struct SimPulseOutput {
    /// Every pulse accepted so far, oldest first
    pub pulses: Vec<PulseRecord>,

    /// Frequency set by the last call to [`PulseOutput::init`]
    pub frequency_hz: Option<f64>,

    /// Number of times the bus has been brought up
    pub bus_begins: usize,

    /// When set, bringing the bus up fails
    pub fail_bus: bool,

    /// When set, pulses on this channel fail with an I2C error
    pub fail_channel: Option<u8>,

    /// When set, only this many of the most recent pulses are kept
    pub history_limit: Option<usize>,
}

/// A single pulse accepted by a [`SimPulseOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseRecord {
    pub channel: u8,
    pub phase: u16,
    pub ticks: u16,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimPulseOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an output which only remembers the last `limit` pulses.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            history_limit: Some(limit),
            ..Default::default()
        }
    }

    /// Pulses recorded for one channel, oldest first.
    pub fn pulses_on(&self, channel: u8) -> Vec<PulseRecord> {
        self.pulses
            .iter()
            .filter(|p| p.channel == channel)
            .copied()
            .collect()
    }
}

impl Bus for SimPulseOutput {
    fn begin(&mut self) -> Result<(), ServoError> {
        if self.fail_bus {
            return Err(ServoError::BusInit(String::from("simulated bus failure")));
        }

        self.bus_begins += 1;
        Ok(())
    }
}

impl PulseOutput for SimPulseOutput {
    fn init(&mut self, frequency_hz: f64) -> Result<(), ServoError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(ServoError::InvalidFrequency(frequency_hz));
        }

        self.frequency_hz = Some(frequency_hz);
        Ok(())
    }

    fn set_pulse(&mut self, channel: u8, phase: u16, ticks: u16) -> Result<(), ServoError> {
        if channel >= NUM_CHANNELS {
            return Err(ServoError::InvalidChannel(channel));
        }
        if ticks > MAX_TICKS {
            return Err(ServoError::InvalidTicks(ticks));
        }
        if self.fail_channel == Some(channel) {
            return Err(ServoError::I2c);
        }

        trace!("Sim pulse: channel {}, phase {}, ticks {}", channel, phase, ticks);

        self.pulses.push(PulseRecord {
            channel,
            phase,
            ticks,
        });

        if let Some(limit) = self.history_limit {
            if self.pulses.len() > limit {
                let excess = self.pulses.len() - limit;
                self.pulses.drain(..excess);
            }
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_output_records() {
        let mut out = SimPulseOutput::new();

        out.begin().unwrap();
        out.init(50.0).unwrap();
        out.set_pulse(3, 0, 307).unwrap();
        out.set_pulse(4, 0, 102).unwrap();

        assert_eq!(out.bus_begins, 1);
        assert_eq!(out.frequency_hz, Some(50.0));
        assert_eq!(
            out.pulses_on(3),
            vec![PulseRecord {
                channel: 3,
                phase: 0,
                ticks: 307
            }]
        );
        assert_eq!(out.pulses.len(), 2);
    }

    #[test]
    fn test_sim_output_history_limit() {
        let mut out = SimPulseOutput::with_history_limit(2);

        for ticks in 100..105 {
            out.set_pulse(0, 0, ticks).unwrap();
        }

        let ticks: Vec<u16> = out.pulses.iter().map(|p| p.ticks).collect();
        assert_eq!(ticks, vec![103, 104]);
    }

    #[test]
    fn test_sim_output_rejects() {
        let mut out = SimPulseOutput {
            fail_bus: true,
            fail_channel: Some(2),
            ..Default::default()
        };

        assert!(matches!(out.begin(), Err(ServoError::BusInit(_))));
        assert_eq!(out.set_pulse(16, 0, 10), Err(ServoError::InvalidChannel(16)));
        assert_eq!(out.set_pulse(0, 0, 4096), Err(ServoError::InvalidTicks(4096)));
        assert_eq!(out.set_pulse(2, 0, 10), Err(ServoError::I2c));
        assert!(out.pulses.is_empty());
    }
}

//! [`PulseOutput`] implementation for the PCA9685 driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::blocking::i2c::{Write, WriteRead};
use pwm_pca9685::{Channel, Pca9685};

use super::{Bus, PulseOutput, ServoError, MAX_TICKS, PWM_RESOLUTION};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Frequency of the PCA9685's internal oscillator.
///
/// Units: hertz
const OSCILLATOR_FREQ_HZ: f64 = 25_000_000.0;

/// Smallest prescale value accepted by the PCA9685.
const MIN_PRESCALE: f64 = 3.0;

/// Largest prescale value accepted by the PCA9685.
const MAX_PRESCALE: f64 = 255.0;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> Bus for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    /// Enabling the board is the first transaction on the bus, so it fails if the bus is down.
    fn begin(&mut self) -> Result<(), ServoError> {
        self.enable().map_err(map_error)
    }
}

impl<I2C, E> PulseOutput for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    fn init(&mut self, frequency_hz: f64) -> Result<(), ServoError> {
        let prescale = prescale(frequency_hz)?;

        self.set_prescale(prescale).map_err(map_error)
    }

    fn set_pulse(&mut self, channel: u8, phase: u16, ticks: u16) -> Result<(), ServoError> {
        if ticks > MAX_TICKS {
            return Err(ServoError::InvalidTicks(ticks));
        }

        let on = phase % PWM_RESOLUTION;
        let off = (on + ticks) % PWM_RESOLUTION;

        self.set_channel_on_off(channel_from_index(channel)?, on, off)
            .map_err(map_error)
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open the PCA9685 on the given Raspberry Pi I2C bus.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn open(bus: u8, address: u8) -> Result<Pca9685<rppal::i2c::I2c>, ServoError> {
    let i2c = rppal::i2c::I2c::with_bus(bus).map_err(|e| ServoError::BusInit(e.to_string()))?;

    Pca9685::new(i2c, pwm_pca9685::Address::from(address)).map_err(map_error)
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Calculate the prescale register value which produces the given output frequency.
fn prescale(frequency_hz: f64) -> Result<u8, ServoError> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(ServoError::InvalidFrequency(frequency_hz));
    }

    let prescale = (OSCILLATOR_FREQ_HZ / (PWM_RESOLUTION as f64 * frequency_hz)).round() - 1.0;

    if prescale < MIN_PRESCALE || prescale > MAX_PRESCALE {
        return Err(ServoError::InvalidFrequency(frequency_hz));
    }

    Ok(prescale as u8)
}

fn channel_from_index(index: u8) -> Result<Channel, ServoError> {
    Ok(match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        i => return Err(ServoError::InvalidChannel(i)),
    })
}

fn map_error<E>(e: pwm_pca9685::Error<E>) -> ServoError {
    match e {
        pwm_pca9685::Error::I2C(_) => ServoError::I2c,
        pwm_pca9685::Error::InvalidInputData => ServoError::InvalidTicks(MAX_TICKS + 1),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prescale() {
        assert_eq!(prescale(50.0), Ok(121));
        assert_eq!(prescale(60.0), Ok(101));
        assert_eq!(prescale(1526.0), Ok(3));

        assert_eq!(prescale(0.0), Err(ServoError::InvalidFrequency(0.0)));
        assert_eq!(prescale(10.0), Err(ServoError::InvalidFrequency(10.0)));
        assert_eq!(prescale(5000.0), Err(ServoError::InvalidFrequency(5000.0)));
    }

    #[test]
    fn test_channel_from_index() {
        assert!(matches!(channel_from_index(0), Ok(Channel::C0)));
        assert!(matches!(channel_from_index(15), Ok(Channel::C15)));
        assert_eq!(
            channel_from_index(16).err(),
            Some(ServoError::InvalidChannel(16))
        );
    }
}

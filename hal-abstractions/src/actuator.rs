//! Actuator outputs driven by external writes
//!
//! A sensor slot may own an actuator. When a peer writes the slot's value the
//! registry stores it and then hands it to the actuator, which is the only
//! place the value reaches hardware.

use embedded_hal::pwm::SetDutyCycle;

/// Highest brightness step accepted by a dimmer channel
pub const DIMMER_MAX: u16 = 255;

/// Actuator failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// The peripheral rejected the new output state
    Hardware,
}

impl core::fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hardware => write!(f, "Actuator hardware error"),
        }
    }
}

impl core::error::Error for ActuatorError {}

/// Side effect of a successful external write
pub trait SensorActuator {
    fn on_external_set(&mut self, name: char, value: i64) -> Result<(), ActuatorError>;
}

/// One PWM dimmer channel
///
/// Values are clamped to `0..=DIMMER_MAX`. The LED driver sinks current, so
/// the duty cycle is inverted: brightness 0 is a full-on duty cycle.
pub struct PwmDimmer<P> {
    channel: P,
}

impl<P: SetDutyCycle> PwmDimmer<P> {
    /// Wrap a channel and switch it dark
    pub fn new(mut channel: P) -> Self {
        // A failed initial write leaves the channel at its reset state,
        // which the first external set overwrites anyway.
        let _ = channel.set_duty_cycle_fully_on();
        Self { channel }
    }

    /// Give the channel back to the board
    pub fn release(self) -> P {
        self.channel
    }

    /// Clamp a requested brightness to the dimmer range
    pub fn brightness(value: i64) -> u16 {
        value.clamp(0, i64::from(DIMMER_MAX)) as u16
    }
}

impl<P: SetDutyCycle> SensorActuator for PwmDimmer<P> {
    fn on_external_set(&mut self, _name: char, value: i64) -> Result<(), ActuatorError> {
        let level = Self::brightness(value);
        self.channel
            .set_duty_cycle_fraction(DIMMER_MAX - level, DIMMER_MAX)
            .map_err(|_| ActuatorError::Hardware)
    }
}

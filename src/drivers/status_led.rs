//! Operator status LED (active low).
//!
//! Display only; toggled by the operator commands.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct StatusLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap the pin and switch the LED off.
    pub fn new(pin: P) -> Result<Self, ActuatorError> {
        let mut led = Self { pin, on: true };
        led.set(false)?;
        Ok(led)
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        // Sinks current: LOW lights it.
        let result = if on {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

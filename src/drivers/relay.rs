//! Pump override relay (normally closed).
//!
//! The relay contacts sit in series with the upstream controller's pump
//! feed.  De-energised (LOW) the contacts are closed and the pump follows
//! upstream; energised (HIGH) they open and the pump is forced off.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  It holds no policy: the state machine
//! decides, the service applies the decision once per tick.

use embedded_hal::digital::OutputPin;
use log::{error, info};

use crate::error::ActuatorError;

pub struct RelayDriver<P> {
    pin: P,
    /// Last level successfully written.  `None` until the first write.
    forced_off: Option<bool>,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Wrap the relay pin and drive it to the released (pump allowed)
    /// level.
    pub fn new(pin: P) -> Result<Self, ActuatorError> {
        let mut relay = Self {
            pin,
            forced_off: None,
        };
        relay.apply(false)?;
        Ok(relay)
    }

    /// Drive the relay.  Idempotent: the GPIO is rewritten every call so a
    /// glitched output is corrected on the next tick, but the change is
    /// only logged when the level actually changes.
    pub fn apply(&mut self, force_off: bool) -> Result<(), ActuatorError> {
        let result = if force_off {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = result {
            error!("Relay GPIO write failed: {e:?}");
            return Err(ActuatorError::GpioWriteFailed);
        }
        if self.forced_off != Some(force_off) {
            info!(
                "Relay: {}",
                if force_off { "pump FORCED OFF" } else { "pump released" }
            );
        }
        self.forced_off = Some(force_off);
        Ok(())
    }

    /// Last level successfully written (`false` before any write).
    pub fn forced_off(&self) -> bool {
        self.forced_off.unwrap_or(false)
    }
}

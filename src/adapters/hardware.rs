//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the relay and the status LED, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  Generic over the
//! embedded-hal SPI device and output pins, so the same adapter runs on
//! ESP-IDF drivers and on host mocks.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::relay::RelayDriver;
use crate::drivers::status_led::StatusLed;
use crate::fsm::context::SensorSnapshot;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<SPI, RELAY, LED> {
    sensor_hub: SensorHub<SPI>,
    relay: RelayDriver<RELAY>,
    led: StatusLed<LED>,
}

impl<SPI, RELAY, LED> HardwareAdapter<SPI, RELAY, LED>
where
    SPI: SpiDevice,
    RELAY: OutputPin,
    LED: OutputPin,
{
    pub fn new(sensor_hub: SensorHub<SPI>, relay: RelayDriver<RELAY>, led: StatusLed<LED>) -> Self {
        Self {
            sensor_hub,
            relay,
            led,
        }
    }

    pub fn sensor_hub(&mut self) -> &mut SensorHub<SPI> {
        &mut self.sensor_hub
    }

    /// Level last written to the relay.
    pub fn relay_forced_off(&self) -> bool {
        self.relay.forced_off()
    }

    pub fn status_led_on(&self) -> bool {
        self.led.is_on()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<SPI, RELAY, LED> SensorPort for HardwareAdapter<SPI, RELAY, LED>
where
    SPI: SpiDevice,
    RELAY: OutputPin,
    LED: OutputPin,
{
    fn read_all(&mut self, elapsed_secs: f32) -> SensorSnapshot {
        self.sensor_hub.read_all(elapsed_secs)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<SPI, RELAY, LED> ActuatorPort for HardwareAdapter<SPI, RELAY, LED>
where
    SPI: SpiDevice,
    RELAY: OutputPin,
    LED: OutputPin,
{
    fn set_pump_override(&mut self, force_off: bool) {
        if let Err(e) = self.relay.apply(force_off) {
            warn!("Relay command not applied ({e}), retrying next tick");
        }
    }

    fn set_status_led(&mut self, on: bool) {
        if let Err(e) = self.led.set(on) {
            warn!("Status LED write failed: {e}");
        }
    }
}

//! Port traits: the hexagonal boundary between the controller and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControllerService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, event sinks) implement these
//! traits.  The [`ControllerService`](super::service::ControllerService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::fsm::context::SensorSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SensorPort {
    /// Take the pulse count, read the ADC and return a unified snapshot
    /// for the interval of `elapsed_secs` that just ended.
    fn read_all(&mut self, elapsed_secs: f32) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.
///
/// Both calls are idempotent.  Adapters log write failures themselves;
/// the service re-applies the relay command every tick, so a failed
/// write is retried on the next one.
pub trait ActuatorPort {
    /// `true` = relay holds the pump off.
    fn set_pump_override(&mut self, force_off: bool);

    /// Display-only operator LED.
    fn set_status_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

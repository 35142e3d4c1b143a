//! Inputs threaded into the override state machine each tick.
//!
//! `SensorSnapshot` is what the sensor hub produces; `TickInput` is the
//! reduced view the state machine actually consumes (gate, flow, time).
//! Keeping the machine's input this small lets tests drive it without
//! any hardware types.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Sensor snapshot (written by the sensor hub, read by the service)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every input the controller samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorSnapshot {
    /// Raw 10-bit ADC code of the battery divider.  Reporting only.
    pub battery_raw: u16,
    /// Raw 10-bit ADC code of the solar panel divider.  Reporting only.
    pub solar_raw: u16,
    /// Raw 10-bit ADC code of the upstream controller's pump drive line.
    pub pump_level_raw: u16,
    /// False when the ADC read failed and the codes above are the last
    /// good values.
    pub adc_ok: bool,

    /// Pulses counted during the last interval.
    pub pulse_count: u32,
    /// Flow rate derived from `pulse_count` (L/hour).
    pub flow_l_per_hour: f32,
}

impl SensorSnapshot {
    /// Whether the upstream controller is driving the pump.
    ///
    /// At or above `threshold` counts as on.
    pub fn pump_commanded_on(&self, threshold: u16) -> bool {
        self.pump_level_raw >= threshold
    }
}

// ---------------------------------------------------------------------------
// State machine input
// ---------------------------------------------------------------------------

/// Everything one state machine tick depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Gate: upstream controller is asking for the pump.
    pub pump_commanded_on: bool,
    /// Flow sample for this tick (L/hour).
    pub flow_l_per_hour: f32,
    /// Monotonic time of this tick (ms, wrapping).
    pub now_ms: u32,
}

impl TickInput {
    /// Build the machine input from a snapshot and the configured gate
    /// threshold.
    pub fn from_snapshot(snapshot: &SensorSnapshot, pump_on_threshold: u16, now_ms: u32) -> Self {
        Self {
            pump_commanded_on: snapshot.pump_commanded_on(pump_on_threshold),
            flow_l_per_hour: snapshot.flow_l_per_hour,
            now_ms,
        }
    }
}

//! Outbound application events.
//!
//! The [`ControllerService`](super::service::ControllerService) emits
//! these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them.

use core::fmt;

use heapless::Vec;
use serde::Serialize;

use crate::control::window::WINDOW_MAX;
use crate::fsm::{Mode, Transition};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started; relay released, LED off.
    Started,

    /// The override state machine reported a transition.
    Interlock(Transition),

    /// Mode differs from the previous tick.
    ModeChanged { from: Mode, to: Mode },

    /// Operator reset cleared the override state.
    OverrideReset {
        cleared_attempts: u8,
        was_forced_off: bool,
    },

    /// Operator toggled the status LED.
    StatusLed(bool),

    /// Periodic full status.
    Telemetry(StatusReport),
}

/// A point-in-time status snapshot for logging and the HTTP surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub uptime_ms: u32,

    pub battery_raw: u16,
    pub solar_raw: u16,
    pub pump_level_raw: u16,
    pub adc_ok: bool,
    pub pump_commanded_on: bool,

    pub mode: Mode,
    pub force_off: bool,
    pub retry_attempts: u8,
    pub max_retry_attempts: u8,
    pub last_retry_ms: Option<u32>,

    /// Last flow sample (L/hour).
    pub flow_l_per_hour: f32,
    /// Window average, once enough samples are held.
    pub mean_flow: Option<f32>,
    /// Window contents, oldest first.
    pub window: Vec<f32, WINDOW_MAX>,

    pub status_led_on: bool,
}

/// One-line status, e.g.
/// `61000 -> PS: battery 812 solar 640 wlpump 368 override_off 0 flowbuffer [120.0, 118.5] lastflowretry -`
impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> PS: battery {} solar {} wlpump {} override_off {} flowbuffer [",
            self.uptime_ms,
            self.battery_raw,
            self.solar_raw,
            self.pump_level_raw,
            u8::from(self.force_off)
        )?;
        for (i, sample) in self.window.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{sample:.1}")?;
        }
        f.write_str("] lastflowretry ")?;
        match self.last_retry_ms {
            Some(ms) => write!(f, "{ms}"),
            None => f.write_str("-"),
        }
    }
}

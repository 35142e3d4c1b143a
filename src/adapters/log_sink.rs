//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::fsm::Transition;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(report) => {
                info!("TELEM | {report}");
            }
            AppEvent::Interlock(t) => match t {
                Transition::GateReleased => {
                    info!("INTERLOCK | gate closed, override state cleared");
                }
                Transition::OverrideEngaged {
                    mean_flow,
                    retries_left,
                } => {
                    warn!(
                        "INTERLOCK | override engaged, mean={:.1}L/h retries_left={}",
                        mean_flow, retries_left
                    );
                }
                Transition::RetryStarted { attempt, max } => {
                    info!("INTERLOCK | retry {}/{}", attempt, max);
                }
                Transition::FlowRecovered { mean_flow } => {
                    info!("INTERLOCK | flow recovered, mean={:.1}L/h", mean_flow);
                }
                Transition::RetriesForgiven { count } => {
                    info!("INTERLOCK | healthy flow, {} retries forgiven", count);
                }
            },
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from, to);
            }
            AppEvent::OverrideReset {
                cleared_attempts,
                was_forced_off,
            } => {
                info!(
                    "RESET | operator reset, was_forced_off={} cleared_attempts={}",
                    was_forced_off, cleared_attempts
                );
            }
            AppEvent::StatusLed(on) => {
                info!("LED | {}", if *on { "on" } else { "off" });
            }
            AppEvent::Started => {
                info!("START | relay released, mode=Normal");
            }
        }
    }
}

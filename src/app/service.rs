//! Application service: the hexagonal core.
//!
//! [`ControllerService`] owns the override state machine and the latest
//! sensor snapshot.  It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, so the whole service is
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │   ControllerService    │
//! ActuatorPort ◀──│  gate · window · retry │
//!                 └────────────────────────┘
//! ```

use heapless::Vec;
use log::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::error::ConfigError;
use crate::fsm::context::{SensorSnapshot, TickInput};
use crate::fsm::{Mode, OverrideFsm, Transition};
use crate::scheduler::ControlTick;

use super::commands::AppCommand;
use super::events::{AppEvent, StatusReport};
use super::ports::{ActuatorPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// ControllerService
// ───────────────────────────────────────────────────────────────

/// Orchestrates one pump interlock.
pub struct ControllerService {
    config: ControllerConfig,
    fsm: OverrideFsm,
    last_snapshot: SensorSnapshot,
    last_mean: Option<f32>,
    pump_commanded_on: bool,
    status_led_on: bool,
    tick_count: u64,
}

impl ControllerService {
    /// Construct the service.  Rejects an invalid configuration.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fsm = OverrideFsm::new(&config);
        Ok(Self {
            config,
            fsm,
            last_snapshot: SensorSnapshot::default(),
            last_mean: None,
            pump_commanded_on: false,
            status_led_on: false,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the outputs in their boot state: relay released, LED off.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_pump_override(false);
        hw.set_status_led(false);
        self.status_led_on = false;
        sink.emit(&AppEvent::Started);
        info!(
            "ControllerService started: window {} (min {}), min flow {:.1} L/h, retry {} s x{}",
            self.config.window_capacity,
            self.config.min_samples,
            self.config.min_flow_l_per_hour,
            self.config.retry_period_secs,
            self.config.max_retry_attempts
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: sensors → gate → state machine → relay.
    ///
    /// The relay is written exactly once per call.  Returns the relay
    /// command (`true` = pump forced off).
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        tick: ControlTick,
        sink: &mut impl EventSink,
    ) -> bool {
        self.tick_count += 1;
        let prev_mode = self.fsm.mode();

        // 1. Read sensors via SensorPort
        let snapshot = hw.read_all(tick.elapsed_secs());
        let input = TickInput::from_snapshot(&snapshot, self.config.pump_on_threshold, tick.now_ms);
        debug!(
            "Pump {} (level {}), flow {:.1} L/h",
            if input.pump_commanded_on { "on" } else { "off" },
            snapshot.pump_level_raw,
            input.flow_l_per_hour
        );

        // 2. State machine
        let outcome = self.fsm.tick(&input);

        // 3. Apply relay via ActuatorPort
        hw.set_pump_override(outcome.force_off);

        // 4. Events
        for t in &outcome.transitions {
            if let Transition::OverrideEngaged {
                retries_left: 0, ..
            } = t
            {
                warn!("Retries exhausted: pump held off until reset");
            }
            sink.emit(&AppEvent::Interlock(*t));
        }
        let mode = self.fsm.mode();
        if mode != prev_mode {
            sink.emit(&AppEvent::ModeChanged {
                from: prev_mode,
                to: mode,
            });
        }

        self.last_snapshot = snapshot;
        self.pump_commanded_on = input.pump_commanded_on;
        if !input.pump_commanded_on || outcome.transitions.iter().any(Transition::clears_window) {
            self.last_mean = None;
        } else if outcome.mean_flow.is_some() {
            self.last_mean = outcome.mean_flow;
        }

        outcome.force_off
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ResetEnable => {
                self.set_status_led(true, hw, sink);

                let prev_mode = self.fsm.mode();
                let was_forced_off = self.fsm.force_off();
                let cleared_attempts = self.fsm.retry_attempts();
                self.fsm.reset();
                self.last_mean = None;
                // Release the relay now rather than on the next tick.
                hw.set_pump_override(self.fsm.force_off());

                sink.emit(&AppEvent::OverrideReset {
                    cleared_attempts,
                    was_forced_off,
                });
                if prev_mode != self.fsm.mode() {
                    sink.emit(&AppEvent::ModeChanged {
                        from: prev_mode,
                        to: self.fsm.mode(),
                    });
                }
            }
            AppCommand::Disable => {
                // Display only.  The relay path is left alone.
                self.set_status_led(false, hw, sink);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Full status at `now_ms`.
    pub fn status(&self, now_ms: u32) -> StatusReport {
        let mut window = Vec::new();
        for &sample in self.fsm.window().iter() {
            // Window length never exceeds its storage capacity.
            if window.push(sample).is_err() {
                break;
            }
        }
        StatusReport {
            uptime_ms: now_ms,
            battery_raw: self.last_snapshot.battery_raw,
            solar_raw: self.last_snapshot.solar_raw,
            pump_level_raw: self.last_snapshot.pump_level_raw,
            adc_ok: self.last_snapshot.adc_ok,
            pump_commanded_on: self.pump_commanded_on,
            mode: self.fsm.mode(),
            force_off: self.fsm.force_off(),
            retry_attempts: self.fsm.retry_attempts(),
            max_retry_attempts: self.fsm.max_retry_attempts(),
            last_retry_ms: self.fsm.last_retry_ms(),
            flow_l_per_hour: self.last_snapshot.flow_l_per_hour,
            mean_flow: self.last_mean,
            window,
            status_led_on: self.status_led_on,
        }
    }

    pub fn mode(&self) -> Mode {
        self.fsm.mode()
    }

    /// Current relay command.  Pure: repeated calls without a tick
    /// return the same value and change nothing.
    pub fn force_off(&self) -> bool {
        self.fsm.force_off()
    }

    pub fn retry_attempts(&self) -> u8 {
        self.fsm.retry_attempts()
    }

    pub fn status_led_on(&self) -> bool {
        self.status_led_on
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Read-only view of the state machine (diagnostics, tests).
    pub fn interlock(&self) -> &OverrideFsm {
        &self.fsm
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_status_led(&mut self, on: bool, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.status_led_on = on;
        hw.set_status_led(on);
        sink.emit(&AppEvent::StatusLed(on));
    }
}

//! Pump override state machine.
//!
//! Two modes, one gate, one retry timer:
//!
//! ```text
//!                 mean <= min_flow (window full enough)
//!        ┌────────┐ ─────────────────────────────────▶ ┌─────────────┐
//!        │ Normal │                                    │ OverrideOff │
//!        └────────┘ ◀───────────────────────────────── └─────────────┘
//!            ▲       retry due && attempts < max            │
//!            │       mean > min_flow (window full enough)   │
//!            │                                              │
//!            └──────────── gate closed / reset ─────────────┘
//! ```
//!
//! Each tick runs, in order: gate check, accumulate, assess, retry.
//! The relay command is `mode == OverrideOff`, read after all four steps.
//!
//! Every path that invalidates flow history goes through
//! [`OverrideFsm::reset_observation_window`].

pub mod context;

use core::fmt;

use heapless::Vec;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ControllerConfig;
use crate::control::window::SlidingWindow;
use context::TickInput;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    /// Flow is adequate or not yet assessed.  Pump follows upstream.
    Normal,
    /// Flow was insufficient; the relay is holding the pump off.
    OverrideOff,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::OverrideOff => "OverrideOff",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tick output
// ---------------------------------------------------------------------------

/// Something notable that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Transition {
    /// Gate closed while an override or a retry budget was in play.
    GateReleased,
    /// Average flow at or below threshold: relay now forces the pump off.
    OverrideEngaged { mean_flow: f32, retries_left: u8 },
    /// Cooldown elapsed: pump re-enabled without re-checking flow.
    RetryStarted { attempt: u8, max: u8 },
    /// Healthy average while overridden: back to normal.
    FlowRecovered { mean_flow: f32 },
    /// Healthy average in normal mode cleared earlier retry attempts.
    RetriesForgiven { count: u8 },
}

impl Transition {
    /// The observation window was emptied by this transition.
    pub fn clears_window(&self) -> bool {
        matches!(
            self,
            Self::GateReleased | Self::OverrideEngaged { .. } | Self::RetryStarted { .. }
        )
    }
}

/// Result of one [`OverrideFsm::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Relay command for this tick.
    pub force_off: bool,
    /// Window average, when the window was full enough to assess.
    pub mean_flow: Option<f32>,
    /// Transitions in the order they fired (at most assess + retry).
    pub transitions: Vec<Transition, 2>,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// The override/retry state machine.  One instance per pump.
#[derive(Debug, Clone)]
pub struct OverrideFsm {
    mode: Mode,
    /// When the override was last engaged or retried.
    last_retry_ms: Option<u32>,
    retry_attempts: u8,
    window: SlidingWindow,

    min_samples: usize,
    min_flow: f32,
    retry_period_ms: u32,
    max_retry_attempts: u8,
}

impl OverrideFsm {
    /// Build a machine in `Normal` with an empty window.
    ///
    /// `config` is expected to have passed [`ControllerConfig::validate`].
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            mode: Mode::Normal,
            last_retry_ms: None,
            retry_attempts: 0,
            window: SlidingWindow::new(config.window_capacity as usize),
            min_samples: config.min_samples as usize,
            min_flow: config.min_flow_l_per_hour,
            retry_period_ms: config.retry_period_ms(),
            max_retry_attempts: config.max_retry_attempts,
        }
    }

    /// Advance one sampling tick.
    pub fn tick(&mut self, input: &TickInput) -> TickOutcome {
        let mut transitions = Vec::new();

        // 1. Gate
        if !input.pump_commanded_on {
            if self.mode == Mode::OverrideOff || self.retry_attempts > 0 {
                push(&mut transitions, Transition::GateReleased);
                info!("Pump gate closed: clearing override state");
            }
            self.set_mode(Mode::Normal);
            self.retry_attempts = 0;
            self.reset_observation_window();
            return TickOutcome {
                force_off: false,
                mean_flow: None,
                transitions,
            };
        }

        // 2. Accumulate
        self.window.append(input.flow_l_per_hour);

        // 3. Assess
        let mut mean_flow = None;
        if self.window.is_full_enough(self.min_samples) {
            let mean = self.window.mean().unwrap_or(0.0);
            mean_flow = Some(mean);
            debug!(
                "Average flow {:.1} L/h over {} samples (min {:.1})",
                mean,
                self.window.len(),
                self.min_flow
            );

            if mean > self.min_flow {
                if self.mode == Mode::OverrideOff {
                    push(&mut transitions, Transition::FlowRecovered { mean_flow: mean });
                    self.set_mode(Mode::Normal);
                } else if self.retry_attempts > 0 {
                    push(
                        &mut transitions,
                        Transition::RetriesForgiven {
                            count: self.retry_attempts,
                        },
                    );
                }
                self.retry_attempts = 0;
            } else if self.mode == Mode::Normal {
                let retries_left = self.max_retry_attempts.saturating_sub(self.retry_attempts);
                warn!(
                    "Insufficient flow ({:.1} <= {:.1} L/h): forcing pump off, {} retries left",
                    mean, self.min_flow, retries_left
                );
                self.set_mode(Mode::OverrideOff);
                self.last_retry_ms = Some(input.now_ms);
                self.reset_observation_window();
                push(
                    &mut transitions,
                    Transition::OverrideEngaged {
                        mean_flow: mean,
                        retries_left,
                    },
                );
            }
        }

        // 4. Retry
        if self.mode == Mode::OverrideOff
            && self.retry_due(input.now_ms)
            && self.retry_attempts < self.max_retry_attempts
        {
            self.retry_attempts += 1;
            info!(
                "Retrying pump: attempt {}/{}",
                self.retry_attempts, self.max_retry_attempts
            );
            self.set_mode(Mode::Normal);
            self.reset_observation_window();
            push(
                &mut transitions,
                Transition::RetryStarted {
                    attempt: self.retry_attempts,
                    max: self.max_retry_attempts,
                },
            );
        }

        TickOutcome {
            force_off: self.force_off(),
            mean_flow,
            transitions,
        }
    }

    /// Relay command derived from the current mode.  Pure.
    pub fn force_off(&self) -> bool {
        self.mode == Mode::OverrideOff
    }

    /// Operator reset: back to `Normal` with a fresh budget and history.
    ///
    /// Returns `true` if anything besides the window was cleared.
    pub fn reset(&mut self) -> bool {
        let changed = self.mode != Mode::Normal || self.retry_attempts > 0;
        if changed {
            info!(
                "Override reset (mode {}, {} retries used)",
                self.mode, self.retry_attempts
            );
        }
        self.set_mode(Mode::Normal);
        self.retry_attempts = 0;
        self.reset_observation_window();
        changed
    }

    /// Discard flow history.  Called on every transition that makes past
    /// samples unrepresentative of the pump's current physical state.
    pub fn reset_observation_window(&mut self) {
        self.window.clear();
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn retry_attempts(&self) -> u8 {
        self.retry_attempts
    }

    pub fn max_retry_attempts(&self) -> u8 {
        self.max_retry_attempts
    }

    /// True when overridden with no retries left.
    pub fn retries_exhausted(&self) -> bool {
        self.mode == Mode::OverrideOff && self.retry_attempts >= self.max_retry_attempts
    }

    pub fn last_retry_ms(&self) -> Option<u32> {
        self.last_retry_ms
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn retry_due(&self, now_ms: u32) -> bool {
        match self.last_retry_ms {
            Some(then) => now_ms.wrapping_sub(then) >= self.retry_period_ms,
            // Never engaged: nothing to time out from.
            None => false,
        }
    }

    fn set_mode(&mut self, next: Mode) {
        if next != self.mode {
            info!("FSM transition: {} -> {}", self.mode, next);
            self.mode = next;
        }
    }
}

fn push(transitions: &mut Vec<Transition, 2>, t: Transition) {
    // At most one assess and one retry transition per tick.
    let pushed = transitions.push(t);
    debug_assert!(pushed.is_ok(), "more than two transitions in one tick");
}

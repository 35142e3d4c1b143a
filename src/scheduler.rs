//! Polled control-tick pacer.
//!
//! The main loop never sleeps for a fixed period.  It polls
//! [`TickPacer::poll`] with the current monotonic time and runs a
//! control tick whenever one is due; in between it services commands,
//! WiFi and the watchdog.
//!
//! ```text
//!   loop ──▶ poll(now) ──▶ Some(ControlTick) ──▶ ControllerService::tick
//!                      └─▶ None ──▶ housekeeping, yield
//! ```
//!
//! A late poll fires once and re-anchors to `now`; missed periods are
//! never made up with a burst of ticks.  All arithmetic is wrapping, so
//! the ~49.7-day `u32` millisecond rollover is invisible.

/// One due control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTick {
    /// Monotonic time of this tick (ms, wrapping).
    pub now_ms: u32,
    /// Time since the previous tick (ms).  Used to scale the flow rate.
    pub elapsed_ms: u32,
}

impl ControlTick {
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ms as f32 / 1000.0
    }
}

/// Fixed-interval tick pacer.
#[derive(Debug, Clone)]
pub struct TickPacer {
    interval_ms: u32,
    last_ms: u32,
}

impl TickPacer {
    /// First tick becomes due `interval_ms` after `now_ms`.
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            last_ms: now_ms,
        }
    }

    /// Returns a tick when at least one interval has elapsed since the
    /// previous one.
    pub fn poll(&mut self, now_ms: u32) -> Option<ControlTick> {
        let elapsed_ms = now_ms.wrapping_sub(self.last_ms);
        if elapsed_ms < self.interval_ms {
            return None;
        }
        self.last_ms = now_ms;
        Some(ControlTick { now_ms, elapsed_ms })
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

/// Fires at most once per `period_ms`.  Used for the periodic status log
/// and WiFi link checks.
#[derive(Debug, Clone)]
pub struct Every {
    period_ms: u32,
    last_ms: u32,
}

impl Every {
    pub fn new(period_ms: u32, now_ms: u32) -> Self {
        Self {
            period_ms: period_ms.max(1),
            last_ms: now_ms,
        }
    }

    pub fn due(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

//! Hall-effect flow sensor: ISR pulse counter and flow-rate conversion.
//!
//! The sensor emits a square wave whose frequency is proportional to the
//! flow (`Hz = k * Q`, Q in L/min).  A GPIO ISR increments an atomic
//! counter on each rising edge; once per control tick the sampling task
//! takes-and-resets it and converts the count to L/hour.
//!
//! The counter is the only state shared between interrupt and task
//! context.  It exposes `increment` and `take_and_reset` and nothing
//! else, so no caller can read or write the raw value.

use core::sync::atomic::{AtomicU32, Ordering};

/// Pulse counter shared between the edge ISR (writer) and the sampling
/// task (reader/resetter).
pub struct PulseCounter {
    count: AtomicU32,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Record one pulse.  Lock-free, bounded, safe from ISR context.
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the accumulated count and zero it in one atomic step, so a
    /// pulse landing concurrently is counted exactly once.
    pub fn take_and_reset(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter fed by the flow-sensor GPIO ISR.
/// `static` because ESP-IDF ISR callbacks cannot capture state.
pub static FLOW_PULSES: PulseCounter = PulseCounter::new();

/// Called from the GPIO ISR on each rising edge.
pub fn flow_isr_handler() {
    FLOW_PULSES.increment();
}

/// Converts a pulse count over a sampling interval into L/hour.
#[derive(Debug, Clone, Copy)]
pub struct FlowCalculator {
    /// Pulse frequency (Hz) per L/min.
    pulses_per_lpm: f32,
}

impl FlowCalculator {
    pub fn new(pulses_per_lpm: f32) -> Self {
        Self { pulses_per_lpm }
    }

    /// `L/hour = (count / interval) * 60 / k`.
    ///
    /// A zero or negative interval yields `0.0` (no time, no flow).
    pub fn compute(&self, count: u32, interval_secs: f32) -> f32 {
        if interval_secs <= 0.0 || self.pulses_per_lpm <= 0.0 {
            return 0.0;
        }
        let frequency_hz = count as f32 / interval_secs;
        frequency_hz * 60.0 / self.pulses_per_lpm
    }
}

/// Result of one flow measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowReading {
    /// Pulses counted during the interval.
    pub pulse_count: u32,
    /// Flow rate (L/hour).
    pub l_per_hour: f32,
}

/// Flow sensor driver: counter snapshot + conversion.
pub struct FlowSensor {
    counter: &'static PulseCounter,
    calculator: FlowCalculator,
}

impl FlowSensor {
    pub fn new(counter: &'static PulseCounter, pulses_per_lpm: f32) -> Self {
        Self {
            counter,
            calculator: FlowCalculator::new(pulses_per_lpm),
        }
    }

    /// Take-and-reset the counter and compute the flow for the interval.
    pub fn read(&mut self, elapsed_secs: f32) -> FlowReading {
        let pulse_count = self.counter.take_and_reset();
        FlowReading {
            pulse_count,
            l_per_hour: self.calculator.compute(pulse_count, elapsed_secs),
        }
    }
}

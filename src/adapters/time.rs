//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` (µs since boot).
//! - **`not(target_os = "espidf")`**: `std::time::Instant`, for host
//!   simulation.
//!
//! The control core works in wrapping `u32` milliseconds; every deadline
//! comparison downstream is difference-based.

/// Milliseconds-since-boot clock.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, wrapping at `u32::MAX` (~49.7 days).
    pub fn uptime_ms(&self) -> u32 {
        (self.uptime_us() / 1000) as u32
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

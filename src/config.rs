//! System configuration parameters
//!
//! Every constant consumed by the pump interlock lives here as a named
//! field.  Two profiles exist: production (multi-minute stabilisation
//! window, ten-minute cooldown) and bench (short window, ten-second
//! cooldown) for testing with a hand-operated pump.

use serde::{Deserialize, Serialize};

use crate::control::window::WINDOW_MAX;
use crate::error::ConfigError;

/// Highest raw code the MCP3008 can return (10-bit).
pub const ADC_MAX_CODE: u16 = 1023;

/// Largest cooldown whose wrapping millisecond comparison is unambiguous.
const MAX_RETRY_PERIOD_MS: u64 = (u32::MAX / 2) as u64;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Sampling ---
    /// Control tick period (milliseconds).
    pub sample_interval_ms: u32,

    // --- Flow sensor ---
    /// Sensor calibration: pulse frequency (Hz) per L/min of flow.
    pub pulses_per_lpm: f32,

    // --- Flow assessment ---
    /// Number of flow samples held by the sliding window.
    pub window_capacity: u16,
    /// Samples required before the average is used for a decision.
    pub min_samples: u16,
    /// Average flow (L/hour) that must be exceeded to count as healthy.
    pub min_flow_l_per_hour: f32,

    // --- Gate ---
    /// Raw ADC code at or above which the upstream controller is
    /// considered to be commanding the pump on.
    pub pump_on_threshold: u16,

    // --- Retry ---
    /// Cooldown before an override is optimistically lifted (seconds).
    pub retry_period_secs: u32,
    /// Retries allowed before the override latches until reset.
    pub max_retry_attempts: u8,

    // --- Housekeeping ---
    /// Period of the full status line in the log (seconds).
    pub status_log_interval_secs: u32,
    /// Task watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000, // 1 Hz

            // Hz = 4.8 * Q (L/min)
            pulses_per_lpm: 4.8,

            window_capacity: 256,
            min_samples: 180, // 3 min at 1 Hz
            min_flow_l_per_hour: 100.0,

            // 11.77 V ~= 368; anything over 150 means the pump is driven.
            pump_on_threshold: 150,

            retry_period_secs: 10 * 60,
            max_retry_attempts: 2,

            status_log_interval_secs: 60,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl ControllerConfig {
    /// Short-window profile for bench testing.
    pub fn bench() -> Self {
        Self {
            window_capacity: 8,
            min_samples: 8,
            retry_period_secs: 10,
            status_log_interval_secs: 5,
            ..Self::default()
        }
    }

    /// The profile compiled into this build.
    pub fn selected() -> Self {
        if cfg!(feature = "bench-profile") {
            Self::bench()
        } else {
            Self::default()
        }
    }

    /// Cooldown in milliseconds.
    pub fn retry_period_ms(&self) -> u32 {
        self.retry_period_secs.saturating_mul(1000)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_interval_ms must be > 0"));
        }
        if !self.pulses_per_lpm.is_finite() || self.pulses_per_lpm <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "pulses_per_lpm must be finite and > 0",
            ));
        }
        if self.window_capacity == 0 || self.window_capacity as usize > WINDOW_MAX {
            return Err(ConfigError::ValidationFailed(
                "window_capacity must be within 1..=256",
            ));
        }
        if self.min_samples == 0 {
            return Err(ConfigError::ValidationFailed("min_samples must be > 0"));
        }
        if self.min_samples > self.window_capacity {
            return Err(ConfigError::ValidationFailed(
                "min_samples must be <= window_capacity",
            ));
        }
        if !self.min_flow_l_per_hour.is_finite() || self.min_flow_l_per_hour < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "min_flow_l_per_hour must be finite and >= 0",
            ));
        }
        if self.pump_on_threshold > ADC_MAX_CODE {
            return Err(ConfigError::ValidationFailed(
                "pump_on_threshold must be a 10-bit ADC code",
            ));
        }
        let retry_ms = u64::from(self.retry_period_secs) * 1000;
        if retry_ms == 0 || retry_ms >= MAX_RETRY_PERIOD_MS {
            return Err(ConfigError::ValidationFailed(
                "retry_period_secs must be > 0 and < 2^31 ms",
            ));
        }
        if self.status_log_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "status_log_interval_secs must be > 0",
            ));
        }
        if self.watchdog_timeout_ms <= self.sample_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed sample_interval_ms",
            ));
        }
        Ok(())
    }
}

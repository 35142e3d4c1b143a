//! flowguard firmware library.
//!
//! Flow-gated pump safety interlock: a hall-effect flow sensor, a
//! sliding-window average and an override/retry state machine drive a
//! normally-closed relay in series with an upstream pump controller.
//!
//! Exposes the pure-logic modules for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;

mod esp_link_shims;

//! Application core: pure domain logic, zero I/O.
//!
//! Orchestrates the flow interlock: sensor snapshot in, relay command
//! out, operator commands applied between ticks.  All interaction with
//! hardware happens through the **port traits** in [`ports`], keeping
//! this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;

//! Actuator drivers, interrupt setup and the task watchdog.

pub mod hw_init;
pub mod relay;
pub mod status_led;
pub mod watchdog;

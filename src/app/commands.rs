//! Inbound commands to the application service.
//!
//! These arrive from the operator surface (HTTP) through the command
//! channel and are interpreted by
//! [`ControllerService::handle_command`](super::service::ControllerService::handle_command).

use serde::Serialize;

/// Commands that external adapters can send into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppCommand {
    /// Status LED on, and clear any override: mode back to normal,
    /// retry budget restored, flow history discarded.
    ResetEnable,

    /// Status LED off.  Does not touch the relay path.
    Disable,
}

//! Inter-task communication between the HTTP server and the control loop.
//!
//! Uses an `embassy-sync` bounded channel for commands and a
//! critical-section mutex for the latest status.  Both are statics; no
//! heap allocation, and the HTTP handlers never touch controller state
//! directly.
//!
//! ```text
//! ┌──────────────┐  AppCommand   ┌──────────────┐
//! │ HTTP handler │──────────────▶│ Control loop │
//! │ (httpd task) │◀──────────────│ (main task)  │
//! └──────────────┘ StatusReport  └──────────────┘
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::AppCommand;
use crate::app::events::StatusReport;

/// Channel depth for operator commands.
const COMMAND_DEPTH: usize = 4;

/// Inbound command channel: HTTP task → control loop.
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, AppCommand, COMMAND_DEPTH> =
    Channel::new();

/// Latest status published by the control loop.
pub static STATUS_BOARD: Mutex<CriticalSectionRawMutex, RefCell<Option<StatusReport>>> =
    Mutex::new(RefCell::new(None));

/// Queue a command for the control loop.  Returns `false` when the queue
/// is full (the command is dropped).
pub fn submit_command(cmd: AppCommand) -> bool {
    submit_to(&COMMAND_CHANNEL, cmd)
}

/// Hand every queued command to `f`, in arrival order.
pub fn drain_commands(f: impl FnMut(AppCommand)) {
    drain_from(&COMMAND_CHANNEL, f);
}

/// Replace the published status.
pub fn publish_status(report: StatusReport) {
    STATUS_BOARD.lock(|cell| *cell.borrow_mut() = Some(report));
}

/// Latest published status, if the loop has published one.
pub fn latest_status() -> Option<StatusReport> {
    STATUS_BOARD.lock(|cell| cell.borrow().clone())
}

fn submit_to<const N: usize>(
    channel: &Channel<CriticalSectionRawMutex, AppCommand, N>,
    cmd: AppCommand,
) -> bool {
    match channel.try_send(cmd) {
        Ok(()) => true,
        Err(_) => {
            warn!("Command queue full, dropping {:?}", cmd);
            false
        }
    }
}

fn drain_from<const N: usize>(
    channel: &Channel<CriticalSectionRawMutex, AppCommand, N>,
    mut f: impl FnMut(AppCommand),
) {
    while let Ok(cmd) = channel.try_receive() {
        f(cmd);
    }
}

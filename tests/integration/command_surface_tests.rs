//! Operator commands: HTTP routing → command channel → service →
//! relay/LED pins, plus the published status.

use flowguard::adapters::channels::{
    drain_commands, latest_status, publish_status, submit_command,
};
use flowguard::adapters::http::{
    ROUTE_DISABLE, ROUTE_INDEX, ROUTE_RESET_ENABLE, ROUTE_STATUS_JSON, render_page, route_command,
};
use flowguard::app::commands::AppCommand;
use flowguard::app::events::AppEvent;
use flowguard::fsm::Mode;
use flowguard::sensors::flow::PulseCounter;

use crate::mock_hw::{PULSES_HEALTHY, Rig};

/// Trip, burn both retries and latch off.
fn latch(rig: &mut Rig) {
    rig.run_on(0, 44);
    assert!(rig.app.interlock().retries_exhausted());
}

#[test]
fn reset_releases_latched_relay_immediately() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    latch(&mut rig);
    rig.take_events();
    assert_eq!(rig.relay.level(), Some(true));

    rig.app
        .handle_command(AppCommand::ResetEnable, &mut rig.hw, &mut rig.sink);

    // No tick needed: the relay is already released.
    assert_eq!(rig.relay.level(), Some(false));
    assert_eq!(rig.led.level(), Some(false), "LED on is active low");
    assert!(rig.app.status_led_on());
    assert_eq!(rig.app.mode(), Mode::Normal);
    assert_eq!(rig.app.retry_attempts(), 0);
    assert!(rig.app.interlock().window().is_empty());

    let events = rig.take_events();
    assert!(matches!(events[0], AppEvent::StatusLed(true)));
    assert!(matches!(
        events[1],
        AppEvent::OverrideReset {
            cleared_attempts: 2,
            was_forced_off: true
        }
    ));
    assert!(matches!(
        events[2],
        AppEvent::ModeChanged {
            from: Mode::OverrideOff,
            to: Mode::Normal
        }
    ));
}

#[test]
fn reset_grants_a_fresh_budget() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    latch(&mut rig);

    rig.app
        .handle_command(AppCommand::ResetEnable, &mut rig.hw, &mut rig.sink);

    // Still dry: trips again, but with the full retry budget.
    rig.run_on(0, 8);
    assert!(rig.app.force_off());
    assert!(!rig.app.interlock().retries_exhausted());
    rig.run_on(0, 10);
    assert!(!rig.app.force_off());
    assert_eq!(rig.app.retry_attempts(), 1);
}

#[test]
fn reset_with_nothing_to_clear_keeps_pump_running() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    rig.run_on(PULSES_HEALTHY, 10);
    rig.take_events();

    rig.app
        .handle_command(AppCommand::ResetEnable, &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.relay.level(), Some(false));
    let events = rig.take_events();
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, AppEvent::ModeChanged { .. }))
    );
}

#[test]
fn disable_only_touches_the_led() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    rig.app
        .handle_command(AppCommand::ResetEnable, &mut rig.hw, &mut rig.sink);
    rig.run_on(0, 8);
    assert!(rig.app.force_off());

    let relay_writes = rig.relay.write_count();
    rig.app
        .handle_command(AppCommand::Disable, &mut rig.hw, &mut rig.sink);

    assert!(!rig.app.status_led_on());
    assert_eq!(rig.led.level(), Some(true));
    assert_eq!(rig.relay.write_count(), relay_writes);
    assert_eq!(rig.relay.level(), Some(true));
    assert_eq!(rig.app.mode(), Mode::OverrideOff);
}

#[test]
fn request_uris_map_to_commands() {
    assert_eq!(route_command(ROUTE_RESET_ENABLE), Some(AppCommand::ResetEnable));
    assert_eq!(route_command(ROUTE_DISABLE), Some(AppCommand::Disable));
    assert_eq!(route_command("/LED=OFF?from=page"), Some(AppCommand::Disable));
    assert_eq!(route_command(ROUTE_INDEX), None);
    assert_eq!(route_command(ROUTE_STATUS_JSON), None);
}

/// The only test touching the global channel and status board.
#[test]
fn queued_commands_reach_the_service_and_status_is_published() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    latch(&mut rig);

    let cmd = route_command("/LED=ON").unwrap();
    assert!(submit_command(cmd));

    drain_commands(|cmd| rig.app.handle_command(cmd, &mut rig.hw, &mut rig.sink));
    assert!(!rig.app.force_off());
    assert_eq!(rig.relay.level(), Some(false));

    publish_status(rig.app.status(rig.now_ms()));
    let published = latest_status().unwrap();
    assert_eq!(published.mode, Mode::Normal);
    assert!(published.status_led_on);

    let json = serde_json::to_value(&published).unwrap();
    assert_eq!(json["mode"], "Normal");
    assert_eq!(json["force_off"], false);
    assert_eq!(json["retry_attempts"], 0);

    let html = render_page(Some(&published));
    assert!(html.contains("allowed"));
    assert!(html.contains("Status LED: ON"));
}

//! End-to-end interlock scenarios: pulse counter → SensorHub →
//! ControllerService → relay pin, all through the real
//! [`HardwareAdapter`](flowguard::adapters::hardware::HardwareAdapter).

use flowguard::app::events::AppEvent;
use flowguard::fsm::{Mode, Transition};
use flowguard::sensors::flow::PulseCounter;

use crate::mock_hw::{PULSES_HEALTHY, Rig};

/// 87.5 L/h per 1 s tick: below the 100 L/h threshold.
const PULSES_LOW: u32 = 7;

fn engaged(events: &[AppEvent]) -> Vec<(f32, u8)> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Interlock(Transition::OverrideEngaged {
                mean_flow,
                retries_left,
            }) => Some((*mean_flow, *retries_left)),
            _ => None,
        })
        .collect()
}

fn retries(events: &[AppEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Interlock(Transition::RetryStarted { attempt, .. }) => Some(*attempt),
            _ => None,
        })
        .collect()
}

// ── Boot ─────────────────────────────────────────────────────

#[test]
fn boot_releases_relay_and_darkens_led() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    // Relay LOW = pump follows upstream; LED HIGH = off (active low).
    assert_eq!(rig.relay.level(), Some(false));
    assert_eq!(rig.led.level(), Some(true));
    assert!(!rig.app.status_led_on());
    assert!(matches!(rig.take_events().as_slice(), [AppEvent::Started]));
}

// ── Trip ─────────────────────────────────────────────────────

#[test]
fn dry_run_trips_relay_on_eighth_sample() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    rig.take_events();

    for i in 0..7 {
        assert!(!rig.tick_on(0), "tick {i} must not trip");
        assert_eq!(rig.relay.level(), Some(false));
    }
    assert!(rig.tick_on(0));
    assert_eq!(rig.relay.level(), Some(true));
    rig.assert_relay_matches();

    let events = rig.take_events();
    assert_eq!(engaged(&events), vec![(0.0, 2)]);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::ModeChanged {
            from: Mode::Normal,
            to: Mode::OverrideOff
        }
    )));
    assert_eq!(rig.app.interlock().last_retry_ms(), Some(7000));
}

#[test]
fn healthy_flow_never_trips() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    for _ in 0..60 {
        assert!(!rig.tick_on(PULSES_HEALTHY));
    }
    rig.assert_relay_matches();
    assert_eq!(rig.app.mode(), Mode::Normal);

    let status = rig.app.status(rig.now_ms());
    let mean = status.mean_flow.unwrap();
    assert!((mean - 200.0).abs() < 0.1, "mean was {mean}");
    assert!((status.flow_l_per_hour - 200.0).abs() < 0.1);
    assert_eq!(status.window.len(), 8);
    assert!(engaged(&rig.take_events()).is_empty());
}

#[test]
fn low_flow_trips_with_its_average() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    rig.run_on(PULSES_LOW, 8);
    assert!(rig.app.force_off());
    let e = engaged(&rig.take_events());
    assert_eq!(e.len(), 1);
    assert!((e[0].0 - 87.5).abs() < 0.01);
}

// ── Retry budget ─────────────────────────────────────────────

#[test]
fn two_retries_then_latched_until_gate_closes() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    // t = 0..=7000: trip.
    rig.run_on(0, 8);
    assert!(rig.app.force_off());

    // t = 8000..=16000: cooling down.
    for _ in 0..9 {
        assert!(rig.tick_on(0));
    }
    // t = 17000: first retry releases the relay.
    assert!(!rig.tick_on(0));
    assert_eq!(rig.relay.level(), Some(false));
    assert_eq!(rig.app.retry_attempts(), 1);

    // t = 18000..=25000: re-trip; 26000..=34000 cooling; 35000 retry.
    rig.run_on(0, 8);
    assert!(rig.app.force_off());
    rig.run_on(0, 9);
    assert!(!rig.tick_on(0));
    assert_eq!(rig.app.retry_attempts(), 2);

    // t = 36000..=43000: final trip.
    rig.run_on(0, 8);
    assert!(rig.app.interlock().retries_exhausted());

    // Latched: no third retry however long we wait.
    for _ in 0..200 {
        assert!(rig.tick_on(0));
        rig.assert_relay_matches();
    }

    let events = rig.take_events();
    assert_eq!(retries(&events), vec![1, 2]);
    let trips: Vec<u8> = engaged(&events).iter().map(|(_, left)| *left).collect();
    assert_eq!(trips, vec![2, 1, 0]);

    // Upstream stops commanding the pump: everything clears.
    assert!(!rig.tick_off());
    assert_eq!(rig.relay.level(), Some(false));
    assert_eq!(rig.app.mode(), Mode::Normal);
    assert_eq!(rig.app.retry_attempts(), 0);
    assert!(rig.app.interlock().window().is_empty());
    assert!(
        rig.take_events()
            .iter()
            .any(|e| matches!(e, AppEvent::Interlock(Transition::GateReleased)))
    );
}

#[test]
fn flow_after_retry_forgives_the_attempt() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    rig.run_on(0, 18); // trip at 7000, retry at 17000
    assert_eq!(rig.app.retry_attempts(), 1);

    rig.run_on(PULSES_HEALTHY, 8);
    assert_eq!(rig.app.retry_attempts(), 0);
    assert!(!rig.app.force_off());
    assert!(rig.take_events().iter().any(|e| matches!(
        e,
        AppEvent::Interlock(Transition::RetriesForgiven { count: 1 })
    )));
}

#[test]
fn healthy_average_while_overridden_recovers() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    rig.run_on(0, 8);
    assert!(rig.app.force_off());

    // One good interval is not enough.
    assert!(rig.tick_on(PULSES_HEALTHY));

    rig.run_on(PULSES_HEALTHY, 7);
    assert!(!rig.app.force_off());
    rig.assert_relay_matches();
    assert!(rig.take_events().iter().any(|e| matches!(
        e,
        AppEvent::Interlock(Transition::FlowRecovered { .. })
    )));
}

// ── Gate ─────────────────────────────────────────────────────

#[test]
fn gate_closed_ignores_flow_and_clears_history() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    rig.run_on(0, 5);
    assert_eq!(rig.app.interlock().window().len(), 5);

    for _ in 0..30 {
        assert!(!rig.tick_off());
    }
    assert!(rig.app.interlock().window().is_empty());
    assert_eq!(rig.app.status(rig.now_ms()).mean_flow, None);

    // Fresh window: seven more dry samples are still not enough.
    rig.run_on(0, 7);
    assert!(!rig.app.force_off());
}

#[test]
fn pulses_counted_while_gated_do_not_leak_into_next_interval() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);

    // Flow meter spinning down after the pump stopped.
    for _ in 0..40 {
        PULSES.increment();
    }
    rig.tick_off();
    assert_eq!(PULSES.take_and_reset(), 0);

    rig.tick_on(0);
    assert_eq!(rig.app.status(rig.now_ms()).flow_l_per_hour, 0.0);
}

// ── ADC failures ─────────────────────────────────────────────

#[test]
fn adc_failure_reuses_last_good_level() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    rig.adc.set(0, 800);
    rig.adc.set(1, 600);

    rig.run_on(0, 4);
    rig.adc.fail(true);
    rig.run_on(0, 4);

    // Still gated on: the stale pump level keeps the check running.
    assert!(rig.app.force_off());
    let status = rig.app.status(rig.now_ms());
    assert!(!status.adc_ok);
    assert_eq!((status.battery_raw, status.solar_raw), (800, 600));

    rig.adc.fail(false);
    rig.tick_on(0);
    assert!(rig.app.status(rig.now_ms()).adc_ok);
}

#[test]
fn adc_dead_from_boot_still_latches_off() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    rig.adc.fail(true);

    // No good reading ever: only flow decides.
    rig.run_on(0, 200);
    assert!(rig.app.force_off());
    assert!(rig.app.interlock().retries_exhausted());
    assert_eq!(rig.relay.level(), Some(true));
    rig.assert_relay_matches();

    let status = rig.app.status(rig.now_ms());
    assert!(!status.adc_ok);
    assert!(status.pump_commanded_on);
    assert_eq!(engaged(&rig.take_events()).len(), 3);
}

// ── Status ───────────────────────────────────────────────────

#[test]
fn status_line_reflects_override() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut rig = Rig::bench(&PULSES);
    rig.adc.set(0, 812);
    rig.adc.set(1, 640);

    rig.run_on(0, 10);
    let status = rig.app.status(9000);
    assert_eq!(status.window.len(), 2);
    assert_eq!(
        status.to_string(),
        "9000 -> PS: battery 812 solar 640 wlpump 368 override_off 1 \
         flowbuffer [0.0, 0.0] lastflowretry 7000"
    );
    assert_eq!(rig.app.tick_count(), 10);
}

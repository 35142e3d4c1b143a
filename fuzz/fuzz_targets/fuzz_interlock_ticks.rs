//! Fuzz target: `OverrideFsm::tick`
//!
//! Each 7-byte chunk is one tick: gate flag, flow (f32 bits) and a
//! time step.  Whatever the input, the relay command must follow the
//! mode, the retry budget must hold, and a closed gate must clear
//! everything.
//!
//! cargo fuzz run fuzz_interlock_ticks

#![no_main]

use flowguard::config::ControllerConfig;
use flowguard::fsm::context::TickInput;
use flowguard::fsm::{Mode, OverrideFsm};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = ControllerConfig::bench();
    let mut fsm = OverrideFsm::new(&config);
    let mut now: u32 = 0;

    for chunk in data.chunks_exact(7) {
        let gate = chunk[0] & 1 == 1;
        let flow = f32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]);
        let step = u32::from(u16::from_le_bytes([chunk[5], chunk[6]]));
        now = now.wrapping_add(step.saturating_mul(16));

        let out = fsm.tick(&TickInput {
            pump_commanded_on: gate,
            flow_l_per_hour: flow,
            now_ms: now,
        });

        assert_eq!(out.force_off, fsm.mode() == Mode::OverrideOff);
        assert!(fsm.retry_attempts() <= config.max_retry_attempts);
        assert!(fsm.window().len() <= config.window_capacity as usize);
        if !gate {
            assert_eq!(fsm.mode(), Mode::Normal);
            assert!(fsm.window().is_empty());
        }
    }
});

//! Mock peripherals for integration tests.
//!
//! The real [`HardwareAdapter`] is driven end to end: a fake MCP3008 on
//! the SPI side, recording output pins for the relay and LED, and a
//! per-test static pulse counter standing in for the flow ISR.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorType, Operation, SpiDevice};

use flowguard::adapters::hardware::HardwareAdapter;
use flowguard::app::events::AppEvent;
use flowguard::app::ports::EventSink;
use flowguard::app::service::ControllerService;
use flowguard::config::ControllerConfig;
use flowguard::drivers::relay::RelayDriver;
use flowguard::drivers::status_led::StatusLed;
use flowguard::fsm::Mode;
use flowguard::scheduler::ControlTick;
use flowguard::sensors::adc::Mcp3008;
use flowguard::sensors::flow::{FlowSensor, PulseCounter};
use flowguard::sensors::{AdcChannels, SensorHub};

/// Pump level code that reads as "upstream wants the pump on".
pub const PUMP_ON_LEVEL: u16 = 368;
/// Pulses per 1 s tick that give 200 L/h.
pub const PULSES_HEALTHY: u32 = 16;

// ── MockAdc ───────────────────────────────────────────────────

/// Shared knobs for the fake MCP3008.
#[derive(Clone, Default)]
pub struct AdcHandle {
    codes: Rc<RefCell<[u16; 8]>>,
    fail: Rc<Cell<bool>>,
}

#[allow(dead_code)]
impl AdcHandle {
    pub fn set(&self, channel: usize, code: u16) {
        self.codes.borrow_mut()[channel] = code;
    }

    pub fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

pub struct MockAdc {
    handle: AdcHandle,
}

impl ErrorType for MockAdc {
    type Error = spi::ErrorKind;
}

impl SpiDevice for MockAdc {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        if self.handle.fail.get() {
            return Err(spi::ErrorKind::Other);
        }
        for op in operations {
            if let Operation::Transfer(read, write) = op {
                assert_eq!(write[0], 0x01, "start bit");
                assert_eq!(write[1] & 0x80, 0x80, "single-ended mode");
                let ch = usize::from((write[1] >> 4) & 0x07);
                let code = self.handle.codes.borrow()[ch];
                read[0] = 0;
                read[1] = (code >> 8) as u8;
                read[2] = (code & 0xFF) as u8;
            }
        }
        Ok(())
    }
}

// ── RecordingPin ──────────────────────────────────────────────

/// Output pin that records every level written (`true` = HIGH).
#[derive(Clone, Default)]
pub struct PinHandle {
    writes: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl PinHandle {
    pub fn level(&self) -> Option<bool> {
        self.writes.borrow().last().copied()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }
}

pub struct RecordingPin {
    handle: PinHandle,
}

impl digital::ErrorType for RecordingPin {
    type Error = digital::ErrorKind;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.handle.writes.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.handle.writes.borrow_mut().push(true);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type MockAdapter = HardwareAdapter<MockAdc, RecordingPin, RecordingPin>;

/// A controller wired to mock peripherals, ticking once per second.
pub struct Rig {
    pub app: ControllerService,
    pub hw: MockAdapter,
    pub sink: RecordingSink,
    pub adc: AdcHandle,
    pub relay: PinHandle,
    pub led: PinHandle,
    pulses: &'static PulseCounter,
    now_ms: u32,
}

#[allow(dead_code)]
impl Rig {
    /// Bench profile: window 8, retry every 10 s, two retries.
    pub fn bench(pulses: &'static PulseCounter) -> Self {
        Self::with_config(ControllerConfig::bench(), pulses)
    }

    pub fn with_config(config: ControllerConfig, pulses: &'static PulseCounter) -> Self {
        let adc = AdcHandle::default();
        let relay = PinHandle::default();
        let led = PinHandle::default();

        let hub = SensorHub::new(
            Mcp3008::new(MockAdc {
                handle: adc.clone(),
            }),
            FlowSensor::new(pulses, config.pulses_per_lpm),
            AdcChannels::default(),
        );
        let mut hw = HardwareAdapter::new(
            hub,
            RelayDriver::new(RecordingPin {
                handle: relay.clone(),
            })
            .unwrap(),
            StatusLed::new(RecordingPin {
                handle: led.clone(),
            })
            .unwrap(),
        );

        let mut app = ControllerService::new(config).unwrap();
        let mut sink = RecordingSink::default();
        app.start(&mut hw, &mut sink);

        Self {
            app,
            hw,
            sink,
            adc,
            relay,
            led,
            pulses,
            now_ms: 0,
        }
    }

    /// Time of the next tick.
    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    /// One 1 s tick with the pump commanded on and `pulses` counted.
    /// Returns the relay command.
    pub fn tick_on(&mut self, pulses: u32) -> bool {
        self.adc.set(2, PUMP_ON_LEVEL);
        self.tick(pulses)
    }

    /// One 1 s tick with the pump commanded off.
    pub fn tick_off(&mut self) -> bool {
        self.adc.set(2, 0);
        self.tick(0)
    }

    /// `n` pump-on ticks at a constant pulse count.
    pub fn run_on(&mut self, pulses: u32, n: u32) {
        for _ in 0..n {
            self.tick_on(pulses);
        }
    }

    fn tick(&mut self, pulses: u32) -> bool {
        for _ in 0..pulses {
            self.pulses.increment();
        }
        let tick = ControlTick {
            now_ms: self.now_ms,
            elapsed_ms: 1000,
        };
        let force_off = self.app.tick(&mut self.hw, tick, &mut self.sink);
        self.now_ms = self.now_ms.wrapping_add(1000);
        force_off
    }

    /// The relay pin is HIGH exactly when the service says forced off.
    pub fn assert_relay_matches(&self) {
        assert_eq!(self.relay.level(), Some(self.app.force_off()));
        assert_eq!(self.hw.relay_forced_off(), self.app.force_off());
        assert_eq!(self.app.force_off(), self.app.mode() == Mode::OverrideOff);
    }

    pub fn take_events(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.sink.events)
    }
}

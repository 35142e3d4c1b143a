//! flowguard firmware: main entry point.
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink   MonotonicClock            │
//! │  (Sensor+Actuator)    (EventSink)    (time)                    │
//! │  WifiLink             HTTP server ──▶ channels ──▶ loop        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           ControllerService (pure logic)               │    │
//! │  │     gate · sliding window · override/retry FSM         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Flow ISR ──▶ FLOW_PULSES (atomic) ──▶ SensorHub               │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::config::Config as SpiConfig;
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriverConfig};
use esp_idf_svc::hal::units::FromValueType;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use flowguard::adapters::channels::{drain_commands, publish_status};
use flowguard::adapters::hardware::HardwareAdapter;
use flowguard::adapters::http;
use flowguard::adapters::log_sink::LogEventSink;
use flowguard::adapters::time::MonotonicClock;
use flowguard::adapters::wifi::{WifiCredentials, WifiLink};
use flowguard::app::events::AppEvent;
use flowguard::app::ports::EventSink;
use flowguard::app::service::ControllerService;
use flowguard::config::ControllerConfig;
use flowguard::drivers::hw_init;
use flowguard::drivers::relay::RelayDriver;
use flowguard::drivers::status_led::StatusLed;
use flowguard::drivers::watchdog::Watchdog;
use flowguard::pins;
use flowguard::scheduler::{Every, TickPacer};
use flowguard::sensors::adc::Mcp3008;
use flowguard::sensors::flow::{FLOW_PULSES, FlowSensor};
use flowguard::sensors::{AdcChannels, SensorHub};

/// Link state is checked this often (ms).
const WIFI_POLL_INTERVAL_MS: u32 = 1_000;
/// Loop yield between polls (ms).  Keeps the idle task fed.
const LOOP_YIELD_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  flowguard v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = ControllerConfig::selected();
    config.validate()?;
    info!(
        "Profile: {} | window {} / min {} | min flow {:.1} L/h | retry {} s x{}",
        if cfg!(feature = "bench-profile") { "bench" } else { "production" },
        config.window_capacity,
        config.min_samples,
        config.min_flow_l_per_hour,
        config.retry_period_secs,
        config.max_retry_attempts
    );

    let peripherals = Peripherals::take()?;

    // ── 2. Relay first: pump released until told otherwise ────
    let relay = RelayDriver::new(PinDriver::output(peripherals.pins.gpio5)?)?;
    let led = StatusLed::new(PinDriver::output(peripherals.pins.gpio6)?)?;
    info!(
        "Pins: relay GPIO{} | LED GPIO{} | flow GPIO{} | ADC SPI sclk {} mosi {} miso {} cs {}",
        pins::PUMP_OVERRIDE_RELAY_GPIO,
        pins::STATUS_LED_GPIO,
        pins::FLOW_PULSE_GPIO,
        pins::SPI_SCLK_GPIO,
        pins::SPI_MOSI_GPIO,
        pins::SPI_MISO_GPIO,
        pins::SPI_CS_GPIO
    );

    // ── 3. Flow ISR ───────────────────────────────────────────
    hw_init::init_flow_isr()?;

    // ── 4. MCP3008 on SPI2 ────────────────────────────────────
    let spi = SpiDeviceDriver::new_single(
        peripherals.spi2,
        peripherals.pins.gpio12,
        peripherals.pins.gpio11,
        Some(peripherals.pins.gpio13),
        Some(peripherals.pins.gpio10),
        &SpiDriverConfig::new(),
        &SpiConfig::new().baudrate(pins::ADC_SPI_BAUDRATE_HZ.Hz()),
    )?;
    let sensor_hub = SensorHub::new(
        Mcp3008::new(spi),
        FlowSensor::new(&FLOW_PULSES, config.pulses_per_lpm),
        AdcChannels::default(),
    );

    let mut hw = HardwareAdapter::new(sensor_hub, relay, led);
    match hw.sensor_hub().dump_adc() {
        Ok(codes) => info!("ADC boot dump: {:?}", codes),
        Err(e) => warn!("ADC boot dump failed: {e}"),
    }

    // ── 5. Application service ────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = ControllerService::new(config.clone())?;
    app.start(&mut hw, &mut sink);

    // ── 6. Network (optional; the interlock runs without it) ──
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = match WifiCredentials::from_build_env() {
        Ok(creds) => match WifiLink::connect(peripherals.modem, sysloop, nvs, &creds) {
            Ok(link) => Some(link),
            Err(e) => {
                error!("WiFi bring-up failed: {e:#}; running offline");
                None
            }
        },
        Err(e) => {
            warn!("WiFi disabled: {e}");
            None
        }
    };
    let _http = match wifi {
        Some(_) => match http::start_server() {
            Ok(server) => Some(server),
            Err(e) => {
                error!("HTTP server failed: {e:#}");
                None
            }
        },
        None => None,
    };

    // ── 7. Watchdog ───────────────────────────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 8. Control loop ───────────────────────────────────────
    let clock = MonotonicClock::new();
    let start_ms = clock.uptime_ms();
    let mut pacer = TickPacer::new(config.sample_interval_ms, start_ms);
    let mut status_log = Every::new(
        config.status_log_interval_secs.saturating_mul(1000),
        start_ms,
    );
    let mut wifi_poll = Every::new(WIFI_POLL_INTERVAL_MS, start_ms);

    info!("System ready. Entering control loop.");

    loop {
        let now_ms = clock.uptime_ms();

        // Operator commands queued by the HTTP task.
        let mut handled = false;
        drain_commands(|cmd| {
            app.handle_command(cmd, &mut hw, &mut sink);
            handled = true;
        });

        if let Some(tick) = pacer.poll(now_ms) {
            app.tick(&mut hw, tick, &mut sink);
            let report = app.status(tick.now_ms);
            if status_log.due(now_ms) {
                sink.emit(&AppEvent::Telemetry(report.clone()));
            }
            publish_status(report);
        } else if handled {
            publish_status(app.status(now_ms));
        }

        if let Some(link) = wifi.as_mut() {
            if wifi_poll.due(now_ms) {
                link.poll(now_ms);
            }
        }

        watchdog.feed();
        FreeRtos::delay_ms(LOOP_YIELD_MS);
    }
}

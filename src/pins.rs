//! GPIO / peripheral pin assignments for the flowguard controller board
//! (ESP32-S3).
//!
//! Single source of truth: every driver references this module rather
//! than hard-coding pin numbers.  `main` takes the matching typed pins
//! from `Peripherals`; keep the two in sync.

// ---------------------------------------------------------------------------
// Flow sensor (hall-effect, open-collector pulse output)
// ---------------------------------------------------------------------------

/// Pulse input, rising-edge interrupt, internal pull-up.
pub const FLOW_PULSE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Pump override relay (normally closed)
// ---------------------------------------------------------------------------

/// Digital output: HIGH energises the coil and opens the pump circuit.
/// LOW (boot default) leaves the pump under upstream control.
pub const PUMP_OVERRIDE_RELAY_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Status LED (active low)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// SPI2 bus: MCP3008 ADC
// ---------------------------------------------------------------------------

pub const SPI_SCLK_GPIO: i32 = 12;
pub const SPI_MOSI_GPIO: i32 = 11;
pub const SPI_MISO_GPIO: i32 = 13;
pub const SPI_CS_GPIO: i32 = 10;

/// MCP3008 clock (Hz).  Rated 1.35 MHz at 2.7 V.
pub const ADC_SPI_BAUDRATE_HZ: u32 = 1_000_000;

// ---------------------------------------------------------------------------
// MCP3008 channel map
// ---------------------------------------------------------------------------

/// Battery voltage divider.
pub const ADC_CH_BATTERY: u8 = 0;
/// Solar panel voltage divider.
pub const ADC_CH_SOLAR: u8 = 1;
/// Upstream pump controller's drive output (divided down).
/// ~368 counts at 11.77 V when the pump is commanded on.
pub const ADC_CH_PUMP_LEVEL: u8 = 2;

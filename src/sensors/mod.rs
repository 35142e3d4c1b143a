//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the ADC and the flow sensor and produces one
//! [`SensorSnapshot`] per control tick.

pub mod adc;
pub mod flow;

use embedded_hal::spi::SpiDevice;
use log::{trace, warn};

use crate::config::ADC_MAX_CODE;
use crate::fsm::context::SensorSnapshot;
use adc::Mcp3008;
use flow::FlowSensor;

/// Which MCP3008 input carries which signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcChannels {
    pub battery: u8,
    pub solar: u8,
    pub pump_level: u8,
}

impl Default for AdcChannels {
    fn default() -> Self {
        Self {
            battery: crate::pins::ADC_CH_BATTERY,
            solar: crate::pins::ADC_CH_SOLAR,
            pump_level: crate::pins::ADC_CH_PUMP_LEVEL,
        }
    }
}

/// Raw codes of the three channels the controller samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AdcReading {
    battery: u16,
    solar: u16,
    pump_level: u16,
}

/// Stand-in while the ADC has never answered.  Full-scale pump level
/// keeps the gate open, so flow alone decides and a dead ADC still ends
/// in a latched override.
const NO_READING: AdcReading = AdcReading {
    battery: 0,
    solar: 0,
    pump_level: ADC_MAX_CODE,
};

/// Aggregates the sensor drivers and produces a unified snapshot.
pub struct SensorHub<SPI> {
    adc: Mcp3008<SPI>,
    flow: FlowSensor,
    channels: AdcChannels,
    /// Last successful ADC reading, reused when a read fails.
    last_good: Option<AdcReading>,
}

impl<SPI: SpiDevice> SensorHub<SPI> {
    pub fn new(adc: Mcp3008<SPI>, flow: FlowSensor, channels: AdcChannels) -> Self {
        Self {
            adc,
            flow,
            channels,
            last_good: None,
        }
    }

    /// Sample every input for the interval that just ended.
    ///
    /// The pulse counter is always taken, even when the ADC fails, so
    /// pulses never carry over into the next interval.  A failed ADC read
    /// is logged and the previous good codes are reported instead.  With
    /// no good reading yet, the pump is taken as commanded on.
    pub fn read_all(&mut self, elapsed_secs: f32) -> SensorSnapshot {
        let flow = self.flow.read(elapsed_secs);

        let (adc, adc_ok) = match self.read_adc() {
            Ok(reading) => {
                self.last_good = Some(reading);
                (reading, true)
            }
            Err(e) => match self.last_good {
                Some(reading) => {
                    warn!("ADC read failed ({e}), reusing last good reading");
                    (reading, false)
                }
                None => {
                    warn!("ADC read failed ({e}) before any good reading, gating on flow");
                    (NO_READING, false)
                }
            },
        };

        trace!(
            "ADC battery={} solar={} pump={} | pulses={} flow={:.1} L/h",
            adc.battery, adc.solar, adc.pump_level, flow.pulse_count, flow.l_per_hour
        );

        SensorSnapshot {
            battery_raw: adc.battery,
            solar_raw: adc.solar,
            pump_level_raw: adc.pump_level,
            adc_ok,
            pulse_count: flow.pulse_count,
            flow_l_per_hour: flow.l_per_hour,
        }
    }

    /// Raw dump of all eight ADC inputs.
    pub fn dump_adc(&mut self) -> Result<[u16; adc::CHANNELS as usize], crate::error::SensorError> {
        self.adc.read_all_channels()
    }

    fn read_adc(&mut self) -> Result<AdcReading, crate::error::SensorError> {
        Ok(AdcReading {
            battery: self.adc.read_channel(self.channels.battery)?,
            solar: self.adc.read_channel(self.channels.solar)?,
            pump_level: self.adc.read_channel(self.channels.pump_level)?,
        })
    }
}

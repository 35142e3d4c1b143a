//! MCP3008 10-bit, 8-channel SPI ADC.
//!
//! Single-ended conversion, one three-byte full-duplex transfer per
//! channel:
//!
//! ```text
//! TX: 0000_0001  1ccc_0000  xxxx_xxxx     (start, SGL + channel)
//! RX: xxxx_xxxx  xxxx_x0BB  BBBB_BBBB     (null bit + 10-bit result)
//! ```

use embedded_hal::spi::SpiDevice;
use log::warn;

use crate::error::SensorError;

/// Number of input channels on the MCP3008.
pub const CHANNELS: u8 = 8;

/// MCP3008 driver over any embedded-hal SPI device (bus + CS).
pub struct Mcp3008<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mcp3008<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Read one channel (0..=7), returning the raw 0..=1023 code.
    pub fn read_channel(&mut self, channel: u8) -> Result<u16, SensorError> {
        if channel >= CHANNELS {
            return Err(SensorError::InvalidChannel(channel));
        }
        let tx = [0x01, 0x80 | (channel << 4), 0x00];
        let mut rx = [0u8; 3];
        self.spi.transfer(&mut rx, &tx).map_err(|e| {
            warn!("MCP3008 ch{channel} transfer failed: {e:?}");
            SensorError::AdcReadFailed
        })?;
        Ok((u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]))
    }

    /// Read every channel in order.  Diagnostic dump only.
    pub fn read_all_channels(&mut self) -> Result<[u16; CHANNELS as usize], SensorError> {
        let mut codes = [0u16; CHANNELS as usize];
        for (ch, code) in codes.iter_mut().enumerate() {
            *code = self.read_channel(ch as u8)?;
        }
        Ok(codes)
    }

    /// Give the SPI device back (tests, re-configuration).
    pub fn release(self) -> SPI {
        self.spi
    }
}

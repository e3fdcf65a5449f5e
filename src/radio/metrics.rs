//! Link metrics

use embedded_hal::digital::OutputPin;

use crate::registers::{PktRssiValue, PktSnrValue, RssiValue, Version};
use crate::{Clock, Error, Radio};

impl<SPI, CLK, TXEN, RXEN> Radio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// Duration of the last completed transmit in milliseconds
    pub fn transmit_time(&self) -> u32 {
        self.transmit_time
    }

    /// Payload throughput of the last completed transmit in bytes per
    /// second, or `None` if no transmit has completed yet.
    pub fn data_rate(&self) -> Option<f32> {
        if self.transmit_time == 0 {
            return None;
        }
        Some(1000.0 * self.tx_payload_len as f32 / self.transmit_time as f32)
    }

    /// RSSI of the last packet received, in dBm
    pub fn packet_rssi(&mut self) -> Result<i16, Error> {
        let PktRssiValue(raw) = self.device.read_register()?;
        Ok(raw as i16 - self.rssi_offset()?)
    }

    /// Current RSSI, in dBm
    pub fn rssi(&mut self) -> Result<i16, Error> {
        let RssiValue(raw) = self.device.read_register()?;
        Ok(raw as i16 - self.rssi_offset()?)
    }

    /// SNR of the last packet received, in dB
    pub fn snr(&mut self) -> Result<f32, Error> {
        self.device.read_register::<PktSnrValue>().map(PktSnrValue::db)
    }

    fn rssi_offset(&mut self) -> Result<i16, Error> {
        let Version(version) = self.device.read_register()?;
        Ok(self.config.rssi_offset(version))
    }
}

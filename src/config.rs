//! Modulation and packet configuration state
//!
//! The setters on [`Radio`](crate::Radio) keep a copy of what they programmed
//! here. The operation state machine reads it back to derive the receive
//! symbol timeout and the RSSI offset.

use crate::registers::Modem;

/// LoRa header mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderType {
    /// Length, coding rate and CRC presence are sent in a header
    Explicit = 0x00,
    /// No header; both sides must agree on the packet format
    Implicit = 0x01,
}

/// Power amplifier output pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaPin {
    /// RFO pin, up to 14 dBm
    Rfo = 0x00,
    /// PA_BOOST pin, up to 20 dBm
    PaBoost = 0x80,
}

/// LNA gain selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxGain {
    /// Gain set by the automatic gain controller
    Auto,
    /// Fixed gain step, 1 (maximum) to 6 (minimum)
    Fixed(u8),
}

/// Frequencies below this use the low-frequency RSSI offset
pub const BAND_THRESHOLD_HZ: u32 = 525_000_000;
/// RSSI offset of the SX1276/77/78/79 low-frequency port
pub const RSSI_OFFSET_LF: i16 = 164;
/// RSSI offset of the SX1276/77/78/79 high-frequency port
pub const RSSI_OFFSET_HF: i16 = 157;
/// RSSI offset of the SX1272/73
pub const SX1272_RSSI_OFFSET: i16 = 139;

/// Current modulation and packet parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioConfig {
    /// Selected modem
    pub modem: Modem,
    /// Carrier frequency in Hz
    pub frequency: u32,
    /// Spreading factor, 6 to 12
    pub spreading_factor: u8,
    /// Bandwidth in Hz
    pub bandwidth: u32,
    /// Coding rate denominator, 5 to 8 (4/5 to 4/8)
    pub coding_rate: u8,
    /// Low data rate optimization
    pub ldro: bool,
    /// Header mode
    pub header_type: HeaderType,
    /// Preamble length in symbols
    pub preamble_length: u16,
    /// Payload length used in implicit header mode
    pub payload_length: u8,
    /// Payload CRC generation and check
    pub crc: bool,
    /// I/Q inversion
    pub invert_iq: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            modem: Modem::LoRa,
            frequency: 434_000_000,
            spreading_factor: 7,
            bandwidth: 125_000,
            coding_rate: 5,
            ldro: false,
            header_type: HeaderType::Explicit,
            preamble_length: 12,
            payload_length: 0,
            crc: false,
            invert_iq: false,
        }
    }
}

impl RadioConfig {
    /// Receive symbol timeout for a millisecond budget:
    /// `min(0x3FF, (ms * bandwidth / 1000) >> spreading_factor)`
    pub fn symbol_timeout(&self, timeout_ms: u32) -> u16 {
        let symbols =
            (timeout_ms as u64 * self.bandwidth as u64 / 1000) >> self.spreading_factor;
        symbols.min(0x3FF) as u16
    }

    /// RSSI offset for the configured band and the chip revision
    pub fn rssi_offset(&self, version: u8) -> i16 {
        if version == crate::registers::Version::SX1272 {
            SX1272_RSSI_OFFSET
        } else if self.frequency < BAND_THRESHOLD_HZ {
            RSSI_OFFSET_LF
        } else {
            RSSI_OFFSET_HF
        }
    }
}

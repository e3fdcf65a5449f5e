//! System-related registers
//!
//! This module contains registers for system-level control including:
//! - Operating mode and modem selection
//! - Silicon revision
//! - Reference oscillator selection

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Modem selected by the LongRangeMode bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modem {
    /// (G)FSK/OOK modem
    Fsk = 0x00,
    /// LoRa modem
    LoRa = 0x80,
}

/// Transceiver operating mode, bits 2:0 of RegOpMode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Lowest power; the only mode in which the modem can be switched
    Sleep = 0x00,
    /// Crystal oscillator running, FIFO accessible
    Standby = 0x01,
    /// Frequency synthesis for transmit
    FsTx = 0x02,
    /// Transmit the FIFO content, then fall back to standby
    Tx = 0x03,
    /// Frequency synthesis for receive
    FsRx = 0x04,
    /// Receive until told otherwise
    RxContinuous = 0x05,
    /// Receive one packet or until the symbol timeout, then standby
    RxSingle = 0x06,
    /// Channel activity detection
    Cad = 0x07,
}

impl Mode {
    fn from_bits(value: u8) -> Self {
        match value & 0x07 {
            0x00 => Self::Sleep,
            0x01 => Self::Standby,
            0x02 => Self::FsTx,
            0x03 => Self::Tx,
            0x04 => Self::FsRx,
            0x05 => Self::RxContinuous,
            0x06 => Self::RxSingle,
            _ => Self::Cad,
        }
    }

    /// Whether the chip is currently receiving in either receive mode
    pub fn is_receiving(self) -> bool {
        matches!(self, Self::RxContinuous | Self::RxSingle)
    }
}

/// Operating mode register (address: 0x01)
///
/// # Important Notes
/// - The modem can only be changed while in [`Mode::Sleep`]
/// - The chip leaves [`Mode::Tx`] and [`Mode::RxSingle`] on its own
///   once the operation completes
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct OpMode {
    /// Selected modem
    pub modem: Modem,
    /// Selected operating mode
    pub mode: Mode,
}

impl FromByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let modem = if bytes[0] & 0x80 != 0 {
            Modem::LoRa
        } else {
            Modem::Fsk
        };
        Ok(Self {
            modem,
            mode: Mode::from_bits(bytes[0]),
        })
    }
}

impl ToByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.modem as u8 | self.mode as u8])
    }
}

/// Silicon revision register (address: 0x42)
///
/// - 0x12 = SX1276/77/78/79
/// - 0x22 = SX1272/73
#[register(0x42u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct Version(pub u8);

impl Version {
    /// Revision reported by the SX1276/77/78/79
    pub const SX1276: u8 = 0x12;
    /// Revision reported by the SX1272/73
    pub const SX1272: u8 = 0x22;

    /// Whether the value identifies a supported chip
    pub fn is_known(self) -> bool {
        self.0 == Self::SX1276 || self.0 == Self::SX1272
    }
}

impl FromByteArray for Version {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes[0]))
    }
}

/// Reference oscillator source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// External crystal on XTA/XTB
    Crystal = 0x00,
    /// External clipped sine TCXO on XTA
    Tcxo = 0x10,
}

/// TCXO register (address: 0x4B)
#[register(0x4Bu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct Tcxo(pub Oscillator);

impl ToByteArray for Tcxo {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.0 as u8])
    }
}

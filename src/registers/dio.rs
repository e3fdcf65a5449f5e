//! Digital IO related registers
//!
//! The SX127x has six DIO pins. Only DIO0 is used by the driver: it carries
//! the RxDone or TxDone event that drives the interrupt path.

use core::convert::Infallible;

use regiface::{register, ToByteArray, WritableRegister};

/// Event signalled on DIO0 in LoRa mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dio0Mapping {
    /// DIO0 rises on RxDone
    RxDone = 0x00,
    /// DIO0 rises on TxDone
    TxDone = 0x40,
    /// DIO0 rises on CadDone
    CadDone = 0x80,
}

/// DIO mapping register 1 (address: 0x40)
///
/// Controls the DIO0 to DIO3 mapping. Only the DIO0 field is driven by the
/// driver; the remaining fields are written as zero (DIO1 = RxTimeout,
/// DIO2 = FhssChangeChannel, DIO3 = CadDone).
#[register(0x40u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct DioMapping1 {
    /// DIO0 event
    pub dio0: Dio0Mapping,
}

impl ToByteArray for DioMapping1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.dio0 as u8])
    }
}

//! Packet handling registers
//!
//! This module contains registers of the LoRa packet engine:
//! - FIFO data pointers and base addresses
//! - Interrupt flags
//! - Received payload length
//! - Packet signal quality
//!
//! The 256 byte FIFO is shared between transmit and receive. All access goes
//! through RegFifo (0x00) at the position held in [`FifoAddrPtr`], which the
//! chip advances after every byte.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// FIFO data register (address: 0x00)
pub const REG_FIFO: u8 = 0x00;

/// Declares a register holding one plain byte
macro_rules! byte_register {
    ($(#[$meta:meta])* $name:ident = $address:tt) => {
        $(#[$meta])*
        #[register($address)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
        pub struct $name(pub u8);

        impl FromByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 1];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self(bytes[0]))
            }
        }

        impl ToByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 1];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok([self.0])
            }
        }
    };
}

byte_register!(
    /// FIFO SPI pointer (address: 0x0D)
    ///
    /// Position of the next FIFO read or write. Advanced by the chip on
    /// every RegFifo access.
    FifoAddrPtr = 0x0Du8
);

byte_register!(
    /// FIFO transmit base address (address: 0x0E)
    ///
    /// Where the modulator starts reading the payload when entering TX.
    FifoTxBaseAddr = 0x0Eu8
);

byte_register!(
    /// FIFO receive base address (address: 0x0F)
    FifoRxBaseAddr = 0x0Fu8
);

byte_register!(
    /// Start address of the last packet received (address: 0x10)
    FifoRxCurrentAddr = 0x10u8
);

byte_register!(
    /// Number of payload bytes of the last packet received (address: 0x13)
    RxNbBytes = 0x13u8
);

byte_register!(
    /// Payload length (address: 0x22)
    ///
    /// Bytes to transmit, and the expected length in implicit header mode.
    PayloadLength = 0x22u8
);

byte_register!(
    /// Receive symbol timeout, low 8 bits (address: 0x1F)
    ///
    /// The two high bits live in bits 1:0 of RegModemConfig2.
    SymbTimeoutLsb = 0x1Fu8
);

byte_register!(
    /// RSSI of the last packet received, raw (address: 0x1A)
    PktRssiValue = 0x1Au8
);

byte_register!(
    /// Current RSSI, raw (address: 0x1B)
    RssiValue = 0x1Bu8
);

/// SNR of the last packet received (address: 0x19)
///
/// Two's complement, in steps of 0.25 dB.
#[register(0x19u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct PktSnrValue(pub i8);

impl PktSnrValue {
    /// SNR in dB
    pub fn db(self) -> f32 {
        self.0 as f32 / 4.0
    }
}

impl FromByteArray for PktSnrValue {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes[0] as i8))
    }
}

bitflags! {
    /// LoRa interrupt flags
    ///
    /// Read and cleared through [`IrqFlagsRegister`]. Flags latch until
    /// cleared by writing a 1 to the corresponding bit.
    ///
    /// # Important Notes
    /// - RxDone is raised together with PayloadCrcError on a CRC mismatch
    /// - RxTimeout is only raised in RX single mode
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u8 {
        /// Symbol timeout elapsed in RX single mode
        const RX_TIMEOUT = 1 << 7;
        /// Packet reception complete
        const RX_DONE = 1 << 6;
        /// Payload CRC mismatch
        const PAYLOAD_CRC_ERROR = 1 << 5;
        /// Valid header received in explicit header mode
        const VALID_HEADER = 1 << 4;
        /// Payload transmission complete
        const TX_DONE = 1 << 3;
        /// Channel activity detection finished
        const CAD_DONE = 1 << 2;
        /// FHSS channel change request
        const FHSS_CHANGE_CHANNEL = 1 << 1;
        /// Channel activity detected
        const CAD_DETECTED = 1;
    }
}

impl IrqFlags {
    /// Flags that end a receive operation
    pub const RX_COMPLETE: Self = Self::RX_DONE
        .union(Self::RX_TIMEOUT)
        .union(Self::PAYLOAD_CRC_ERROR);

    /// Flags the chip raises only after the packet has been processed
    pub const RX_EVENTS: Self = Self::RX_TIMEOUT
        .union(Self::RX_DONE)
        .union(Self::PAYLOAD_CRC_ERROR)
        .union(Self::VALID_HEADER);
}

/// Interrupt flags register (address: 0x12)
///
/// Writing a flag clears it; flags written as zero are left alone.
#[register(0x12u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct IrqFlagsRegister(pub IrqFlags);

impl FromByteArray for IrqFlagsRegister {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(IrqFlags::from_bits_retain(bytes[0])))
    }
}

impl ToByteArray for IrqFlagsRegister {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.0.bits()])
    }
}

//! Operation status
//!
//! The status of the current transmit or receive is derived from two pieces
//! of state: the kind of wait that was last armed and the interrupt flags
//! latched when the operation resolved.

use crate::registers::IrqFlags;
use crate::Error;

/// Status of the last armed transmit or receive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationStatus {
    /// Nothing has been armed yet
    Idle,
    /// Transmit armed, not finished
    TxWait,
    /// Transmit finished
    TxDone,
    /// Transmit timed out. The SX127x has no transmit watchdog, so this
    /// status is never produced by this driver.
    TxTimeout,
    /// Single receive armed, no packet yet
    RxWait,
    /// Continuous receive armed, no unread completion
    RxContinuous,
    /// Packet received
    RxDone,
    /// Symbol timeout elapsed without a packet
    RxTimeout,
    /// Packet header invalid. The SX127x LoRa modem drops such packets
    /// without a flag, so this status is never produced by this driver.
    HeaderError,
    /// Packet received with a payload CRC mismatch
    CrcError,
}

impl OperationStatus {
    /// Decodes latched interrupt flags against the armed wait status.
    ///
    /// Timeout is checked first, then CRC error, then TxDone, then RxDone,
    /// so an error raised together with RxDone wins. Without a latch, or
    /// with no terminal flag in it, the wait status is returned unchanged.
    pub fn decode(latched: Option<IrqFlags>, waiting: OperationStatus) -> OperationStatus {
        let Some(flags) = latched else {
            return waiting;
        };

        if flags.contains(IrqFlags::RX_TIMEOUT) {
            Self::RxTimeout
        } else if flags.contains(IrqFlags::PAYLOAD_CRC_ERROR) {
            Self::CrcError
        } else if flags.contains(IrqFlags::TX_DONE) {
            Self::TxDone
        } else if flags.contains(IrqFlags::RX_DONE) {
            Self::RxDone
        } else {
            waiting
        }
    }

    /// Whether the status reports a finished operation
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            Self::Idle | Self::TxWait | Self::RxWait | Self::RxContinuous
        )
    }

    /// The error corresponding to a failed operation, if any
    pub fn error(self) -> Option<Error> {
        match self {
            Self::TxTimeout | Self::RxTimeout => Some(Error::Timeout),
            Self::HeaderError => Some(Error::HeaderError),
            Self::CrcError => Some(Error::CrcError),
            _ => None,
        }
    }
}

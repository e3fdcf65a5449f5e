//! Driver error type
//!
//! Every fallible operation in the crate reports through [`Error`]. Bus and
//! pin failures are erased to a single variant each; register access errors
//! from `regiface` map onto [`Error::Bus`].

/// Errors reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI communication failed
    Bus,
    /// Driving a control line (TXEN, RXEN, reset) or waiting on the
    /// interrupt line failed
    Pin,
    /// The chip never reported a known silicon version after reset.
    /// Carries the last value read from the version register.
    DeviceNotFound(u8),
    /// A transmit or receive is already in flight; the request was rejected
    /// without touching the chip
    OperationInProgress,
    /// More bytes are staged than one packet can carry (255)
    PayloadTooLarge,
    /// `wait` was called with no operation outstanding, or the outstanding
    /// operation was already reported as complete
    NotArmed,
    /// The polled wait budget or the chip's symbol timeout elapsed
    Timeout,
    /// A packet arrived with an invalid header
    HeaderError,
    /// A packet arrived with a payload CRC mismatch
    CrcError,
    /// The shared radio cell holds no radio
    NotInstalled,
    /// The interrupt registration table has no free slot
    RegistryFull,
}

impl From<regiface::errors::Error> for Error {
    fn from(_: regiface::errors::Error) -> Self {
        Error::Bus
    }
}

//! Payload staging and draining
//!
//! Transmit payloads are written into the FIFO ahead of
//! [`end_transmit`](Radio::end_transmit); received payloads are drained
//! from it after completion. The pending count tracks bytes staged for
//! transmit or still unread from the last packet, and the cursor tracks the
//! FIFO position of the next access.

use embedded_hal::digital::OutputPin;

use crate::registers::FifoAddrPtr;
use crate::{Clock, Error, Radio};

/// A fixed-size value that can be framed into a payload
///
/// Values are encoded little-endian.
pub trait PayloadValue: Sized {
    /// Encoded size in bytes
    const SIZE: usize;
    /// Encoded representation
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_payload(&self) -> Self::Bytes;
    fn from_payload(bytes: Self::Bytes) -> Self;
}

macro_rules! payload_value {
    ($($ty:ty),*) => {
        $(
            impl PayloadValue for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();
                type Bytes = [u8; core::mem::size_of::<$ty>()];

                fn to_payload(&self) -> Self::Bytes {
                    self.to_le_bytes()
                }

                fn from_payload(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

payload_value!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl<SPI, CLK, TXEN, RXEN> Radio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// Appends bytes to the transmit payload.
    ///
    /// The FIFO holds 256 bytes but a packet carries at most 255;
    /// [`end_transmit`](Radio::end_transmit) rejects anything longer.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.device.write_register(FifoAddrPtr(self.cursor))?;
        self.device.write_fifo(bytes)?;
        self.cursor = self.cursor.wrapping_add(bytes.len() as u8);
        self.pending += bytes.len();
        Ok(())
    }

    /// Reads up to `buf.len()` bytes of the received payload, returning the
    /// number of bytes read.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let len = buf.len().min(self.pending);
        if len == 0 {
            return Ok(0);
        }

        self.device.write_register(FifoAddrPtr(self.cursor))?;
        self.device.read_fifo(&mut buf[..len])?;
        self.cursor = self.cursor.wrapping_add(len as u8);
        self.pending -= len;
        Ok(len)
    }

    /// Discards `len` unread bytes, or all of them when `len` is zero or
    /// exceeds what is left.
    pub fn purge(&mut self, len: usize) {
        if len == 0 || len >= self.pending {
            self.pending = 0;
        } else {
            self.pending -= len;
        }
    }

    /// Bytes staged for transmit, or left to read from the last packet
    pub fn available(&self) -> usize {
        self.pending
    }

    /// Appends a value to the transmit payload.
    pub fn put<T: PayloadValue>(&mut self, value: T) -> Result<(), Error> {
        self.write(value.to_payload().as_ref())
    }

    /// Reads a value from the received payload.
    ///
    /// Returns the value and the number of bytes still unread afterwards,
    /// capped at `T::SIZE`, so a caller can tell whether another value of
    /// the same type follows. When fewer than `T::SIZE` bytes were left the
    /// missing high-order bytes read as zero.
    pub fn get<T: PayloadValue>(&mut self) -> Result<(T, usize), Error> {
        let mut bytes = T::Bytes::default();
        self.read(bytes.as_mut())?;
        Ok((T::from_payload(bytes), self.pending.min(T::SIZE)))
    }
}

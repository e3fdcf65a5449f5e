//! SX127x Radio Device Interface
//!
//! This module provides the register access layer for SX127x series radio
//! devices over SPI.
//!
//! The interface is built around the `Device<SPI>` struct which wraps an SPI
//! device and provides methods for:
//! - Raw byte transfers, register reads/writes and bit-field writes
//! - Typed register reads and writes through the `regiface` traits
//! - Burst access to the packet FIFO
//!
//! Every access is one chip-select framed transaction. The first byte is the
//! register address with bit 7 set for a write and cleared for a read.
//!
//! # Example
//! ```no_run
//! use sx127x::{Device, registers::Version, Error};
//!
//! fn chip_version<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<u8, Error> {
//!     let mut device = Device::new(spi);
//!     let version: Version = device.read_register()?;
//!     Ok(version.0)
//! }
//! ```

use core::convert::Infallible;

use embedded_hal::spi::Operation;
use regiface::{
    errors::Error as RegifaceError, ByteArray, FromByteArray, ReadableRegister, ToByteArray,
    WritableRegister,
};

use crate::registers::REG_FIFO;
use crate::Error;

const WRITE_BIT: u8 = 0x80;

/// Register access interface for the SX127x radio.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI device.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Exchanges one address byte and one data byte, returning the byte
    /// clocked out by the chip during the data phase.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn transfer(&mut self, address: u8, data: u8) -> Result<u8, Error> {
        let mut frame = [address, data];
        self.spi
            .transfer_in_place(&mut frame)
            .map_err(|_| Error::Bus)?;
        Ok(frame[1])
    }

    /// Reads one register.
    pub fn read(&mut self, address: u8) -> Result<u8, Error> {
        self.transfer(address & !WRITE_BIT, 0x00)
    }

    /// Writes one register.
    pub fn write(&mut self, address: u8, value: u8) -> Result<(), Error> {
        self.transfer(address | WRITE_BIT, value).map(|_| ())
    }

    /// Replaces `width` bits of a register starting at bit `position`,
    /// leaving the other bits untouched.
    ///
    /// # Arguments
    /// * `address` - Register address
    /// * `value` - New field value, right aligned
    /// * `position` - Bit index of the field's least significant bit
    /// * `width` - Field width in bits (1..=8)
    pub fn write_bits(
        &mut self,
        address: u8,
        value: u8,
        position: u8,
        width: u8,
    ) -> Result<(), Error> {
        let current = self.read(address)?;
        let mask = (0xFFu8 >> (8 - width)) << position;
        let updated = ((value << position) & mask) | (current & !mask);
        self.write(address, updated)
    }

    /// Reads a typed register.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed or the value did not parse
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        self.spi
            .transaction(&mut [
                Operation::Write(&[R::id() & !WRITE_BIT]),
                Operation::Read(raw_value.as_mut()),
            ])
            .map_err(|_| RegifaceError::BusError)?;

        Ok(R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)?)
    }

    /// Writes a typed register.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing WritableRegister with u8 ID
    ///
    /// # Arguments
    /// * `register` - The register value to write
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw_value) => raw_value,
            Err(never) => match never {},
        };

        self.spi
            .transaction(&mut [
                Operation::Write(&[R::id() | WRITE_BIT]),
                Operation::Write(raw_value.as_ref()),
            ])
            .map_err(|_| Error::from(RegifaceError::BusError))
    }

    /// Writes bytes to the FIFO at the current FIFO pointer in one burst.
    pub fn write_fifo(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }

        self.spi
            .transaction(&mut [
                Operation::Write(&[REG_FIFO | WRITE_BIT]),
                Operation::Write(bytes),
            ])
            .map_err(|_| Error::Bus)
    }

    /// Reads bytes from the FIFO at the current FIFO pointer in one burst.
    pub fn read_fifo(&mut self, bytes: &mut [u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }

        self.spi
            .transaction(&mut [Operation::Write(&[REG_FIFO]), Operation::Read(bytes)])
            .map_err(|_| Error::Bus)
    }
}

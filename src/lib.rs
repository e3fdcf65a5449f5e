#![cfg_attr(not(test), no_std)]
//! SX127x Radio Driver
//!
//! This crate provides a driver for the Semtech SX1272/73 and SX1276/77/78/79
//! long range transceivers, and the HopeRF RFM9x modules built on them.
//!
//! # Features
//! - Frequency range: 137-1020 MHz
//! - LoRa modulation: SF6-12, BW 7.8-500kHz, CR 4/5-4/8
//! - Output power up to +20 dBm on PA_BOOST
//! - 256 byte packet FIFO shared between transmit and receive
//! - Completion by polling or by the DIO0 interrupt line
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Register access over SPI
//!   - Single register reads, writes and bit-field writes
//!   - Typed register access and FIFO bursts
//!
//! - [`registers`]: Register definitions for direct hardware access,
//!   implementing the `regiface` register traits
//!
//! - [`Radio`]: The transceiver
//!   - Reset, modulation and packet configuration
//!   - Payload staging and draining through the FIFO
//!   - Transmit/receive lifecycle and status
//!   - Interrupt completion path and callbacks
//!   - RSSI, SNR and data rate
//!
//! - [`shared`]: Sharing a radio with interrupt context and routing
//!   interrupt lines to radios
//!
//! # Usage
//! A transmit stages its payload, then arms the chip:
//!
//! 1. [`Radio::begin_transmit`] resets the FIFO position
//! 2. [`Radio::write`] or [`Radio::put`] stage payload bytes
//! 3. [`Radio::end_transmit`] switches the chip to TX
//! 4. [`Radio::wait`] polls for completion, or the interrupt path resolves it
//!
//! A receive is armed with [`Radio::request`], completed the same way, and
//! drained with [`Radio::read`], [`Radio::get`] and [`Radio::purge`].
//! [`Radio::status`] reports how the last operation ended.
//!
//! # Important Notes
//! - The modem can only be changed in sleep mode
//! - Only one operation can be in flight; re-arming is rejected
//! - SF6 only works in implicit header mode
//! - The SX127x has no transmit timeout; a transmit always ends in TxDone
//!
//! # Example
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::SpiDevice;
//! use sx127x::{Clock, Error, OperationStatus, Radio, RxTimeout};
//!
//! fn receive_one<SPI, CLK, RST, D>(
//!     spi: SPI,
//!     clock: CLK,
//!     reset: &mut RST,
//!     delay: &mut D,
//! ) -> Result<usize, Error>
//! where
//!     SPI: SpiDevice,
//!     CLK: Clock,
//!     RST: OutputPin,
//!     D: DelayNs,
//! {
//!     let mut radio = Radio::new(spi, clock);
//!     radio.begin(reset, delay)?;
//!     radio.set_frequency(868_000_000)?;
//!     radio.set_lora_modulation(7, 125_000, 5, false)?;
//!
//!     radio.request(RxTimeout::Millis(5000), false)?;
//!     radio.wait(0)?;
//!     if let Some(e) = radio.status().error() {
//!         return Err(e);
//!     }
//!
//!     let mut packet = [0u8; 255];
//!     radio.read(&mut packet)
//! }
//! ```

#[macro_use]
mod fmt;

mod clock;
mod config;
pub mod device;
mod error;
mod pins;
mod radio;
pub mod registers;
pub mod shared;
mod status;

#[cfg(test)]
mod mock;

pub use clock::Clock;
pub use config::{HeaderType, PaPin, RadioConfig, RxGain};
pub use device::Device;
pub use error::Error;
pub use pins::{NoPin, RfSwitch};
pub use radio::{PayloadValue, Radio, RxTimeout};
pub use shared::{InterruptTable, InterruptTarget, SharedRadio};
pub use status::OperationStatus;

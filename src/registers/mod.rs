//! Register definitions for the SX127x radio
//! Taken from the SX1276/77/78/79 datasheet (rev. 7), LoRa register page.
//!
//! Every SX127x register is a single byte behind a 7-bit address. Types in
//! this module implement the `regiface` register traits with a `u8` id and
//! a one byte array; registers that are only ever written as raw bit fields
//! are listed as address constants.

mod dio;
mod packet;
mod rf;
mod system;

pub use dio::*;
pub use packet::*;
pub use rf::*;
pub use system::*;

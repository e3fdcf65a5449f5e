//! Host-side doubles for the hardware the driver talks to
//!
//! [`Chip`] emulates the SX127x register file and FIFO behind an
//! `SpiDevice`. Handles are cheap clones sharing one state so a test can keep
//! poking at the "hardware" while the radio owns the bus. Reset and
//! interrupt lines and delays come from `embedded-hal-mock`.

#![allow(dead_code)]

use core::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};

use crate::registers::{IrqFlags, Mode, REG_FIFO};
use crate::Clock;

const REG_OP_MODE: u8 = 0x01;
const REG_IRQ_FLAGS: u8 = 0x12;
const REG_FIFO_ADDR_PTR: u8 = 0x0D;
const REG_FIFO_RX_CURRENT_ADDR: u8 = 0x10;
const REG_RX_NB_BYTES: u8 = 0x13;
const REG_VERSION: u8 = 0x42;

struct ChipState {
    registers: [u8; 0x80],
    fifo: [u8; 256],
    irq_reads: usize,
}

impl ChipState {
    fn read(&mut self, address: u8) -> u8 {
        match address {
            REG_FIFO => {
                let ptr = self.registers[REG_FIFO_ADDR_PTR as usize];
                self.registers[REG_FIFO_ADDR_PTR as usize] = ptr.wrapping_add(1);
                self.fifo[ptr as usize]
            }
            address => {
                if address == REG_IRQ_FLAGS {
                    self.irq_reads += 1;
                }
                self.registers[address as usize]
            }
        }
    }

    fn write(&mut self, address: u8, value: u8) {
        match address {
            REG_FIFO => {
                let ptr = self.registers[REG_FIFO_ADDR_PTR as usize];
                self.registers[REG_FIFO_ADDR_PTR as usize] = ptr.wrapping_add(1);
                self.fifo[ptr as usize] = value;
            }
            address if address == REG_IRQ_FLAGS => {
                self.registers[address as usize] &= !value;
            }
            REG_VERSION => {}
            address => self.registers[address as usize] = value,
        }
    }

    fn mode(&self) -> Mode {
        match self.registers[REG_OP_MODE as usize] & 0x07 {
            0x00 => Mode::Sleep,
            0x01 => Mode::Standby,
            0x02 => Mode::FsTx,
            0x03 => Mode::Tx,
            0x04 => Mode::FsRx,
            0x05 => Mode::RxContinuous,
            0x06 => Mode::RxSingle,
            _ => Mode::Cad,
        }
    }
}

/// Emulated SX127x
#[derive(Clone)]
pub struct Chip {
    state: Arc<Mutex<ChipState>>,
}

impl Chip {
    /// A freshly reset SX1276
    pub fn new() -> Self {
        let mut registers = [0u8; 0x80];
        registers[REG_OP_MODE as usize] = 0x09;
        registers[REG_VERSION as usize] = 0x12;
        Self {
            state: Arc::new(Mutex::new(ChipState {
                registers,
                fifo: [0; 256],
                irq_reads: 0,
            })),
        }
    }

    /// An SPI device wired to this chip
    pub fn spi(&self) -> MockSpi {
        MockSpi {
            chip: self.clone(),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut ChipState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn register(&self, address: u8) -> u8 {
        self.with(|s| s.registers[address as usize])
    }

    pub fn set_register(&self, address: u8, value: u8) {
        self.with(|s| s.registers[address as usize] = value)
    }

    pub fn mode(&self) -> Mode {
        self.with(|s| s.mode())
    }

    pub fn fifo(&self, start: u8, len: usize) -> Vec<u8> {
        self.with(|s| {
            (0..len)
                .map(|i| s.fifo[(start as usize + i) % 256])
                .collect()
        })
    }

    pub fn load_fifo(&self, start: u8, bytes: &[u8]) {
        self.with(|s| {
            for (i, b) in bytes.iter().enumerate() {
                s.fifo[(start as usize + i) % 256] = *b;
            }
        })
    }

    /// Latches interrupt flags as the chip would
    pub fn raise(&self, flags: IrqFlags) {
        self.with(|s| s.registers[REG_IRQ_FLAGS as usize] |= flags.bits())
    }

    /// Number of reads of the IRQ flags register so far
    pub fn irq_reads(&self) -> usize {
        self.with(|s| s.irq_reads)
    }

    /// Ends the current transmission: TxDone, back to standby
    pub fn finish_transmit(&self) {
        self.with(|s| {
            s.registers[REG_OP_MODE as usize] = (s.registers[REG_OP_MODE as usize] & !0x07) | 0x01;
            s.registers[REG_IRQ_FLAGS as usize] |= IrqFlags::TX_DONE.bits();
        })
    }

    /// Delivers a packet at FIFO address `at`
    pub fn deliver(&self, at: u8, payload: &[u8], extra: IrqFlags) {
        self.load_fifo(at, payload);
        self.with(|s| {
            s.registers[REG_FIFO_RX_CURRENT_ADDR as usize] = at;
            s.registers[REG_RX_NB_BYTES as usize] = payload.len() as u8;
            s.registers[REG_IRQ_FLAGS as usize] |=
                (IrqFlags::RX_DONE | IrqFlags::VALID_HEADER | extra).bits();
            if s.mode() == Mode::RxSingle {
                s.registers[REG_OP_MODE as usize] = (s.registers[REG_OP_MODE as usize] & !0x07) | 0x01;
            }
        })
    }

    /// Symbol timeout without a packet
    pub fn rx_timeout(&self) {
        self.with(|s| {
            s.registers[REG_IRQ_FLAGS as usize] |= IrqFlags::RX_TIMEOUT.bits();
            s.registers[REG_OP_MODE as usize] = (s.registers[REG_OP_MODE as usize] & !0x07) | 0x01;
        })
    }
}

/// SPI device backed by a [`Chip`]
pub struct MockSpi {
    chip: Chip,
}

impl spi::ErrorType for MockSpi {
    type Error = Infallible;
}

/// Address phase state of one transaction
struct Frame<'a> {
    chip: &'a mut ChipState,
    address: Option<(u8, bool)>,
}

impl Frame<'_> {
    fn exchange(&mut self, out: u8) -> u8 {
        match self.address {
            None => {
                self.address = Some((out & 0x7F, out & 0x80 != 0));
                0x00
            }
            Some((address, write)) => {
                let value = if write {
                    self.chip.write(address, out);
                    0x00
                } else {
                    self.chip.read(address)
                };
                if address != REG_FIFO {
                    self.address = Some((address.wrapping_add(1) & 0x7F, write));
                }
                value
            }
        }
    }
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut state = self.chip.state.lock().unwrap();
        let mut frame = Frame {
            chip: &mut *state,
            address: None,
        };

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    for b in bytes.iter() {
                        frame.exchange(*b);
                    }
                }
                Operation::Read(bytes) => {
                    for b in bytes.iter_mut() {
                        *b = frame.exchange(0x00);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..read.len().max(write.len()) {
                        let value = frame.exchange(write.get(i).copied().unwrap_or(0x00));
                        if let Some(slot) = read.get_mut(i) {
                            *slot = value;
                        }
                    }
                }
                Operation::TransferInPlace(bytes) => {
                    for b in bytes.iter_mut() {
                        *b = frame.exchange(*b);
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

/// Clock advancing by a fixed step on every read
#[derive(Clone)]
pub struct MockClock {
    now: Arc<AtomicU32>,
    step: u32,
}

impl MockClock {
    pub fn new(step: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(0)),
            step,
        }
    }

    pub fn now(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn set(&self, ms: u32) {
        self.now.store(ms, Ordering::SeqCst)
    }
}

impl Clock for MockClock {
    fn now_ms(&mut self) -> u32 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

/// RF switch line whose level stays observable after the radio takes it
#[derive(Clone, Default)]
pub struct MockPin {
    high: Arc<AtomicBool>,
}

impl MockPin {
    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::SeqCst)
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high.store(true, Ordering::SeqCst);
        Ok(())
    }
}

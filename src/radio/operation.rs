//! Transmit and receive lifecycle
//!
//! An operation is armed by [`Radio::end_transmit`] or [`Radio::request`]
//! and resolved by the first completion path to observe it: the polled path
//! in [`Radio::wait`] or the interrupt path in
//! [`Radio::handle_interrupt`](crate::Radio::handle_interrupt). Resolution
//! latches the raw interrupt flags, which [`Radio::status`] decodes.

use embedded_hal::digital::OutputPin;

use super::Operation;
use crate::registers::*;
use crate::{Clock, Error, OperationStatus, Radio};

/// How long a receive stays open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxTimeout {
    /// Receive one packet with no hardware timeout
    Single,
    /// Receive one packet, or give up after roughly this many milliseconds.
    /// The budget is converted to a symbol timeout; zero behaves as
    /// [`RxTimeout::Single`].
    Millis(u32),
    /// Receive packets until told otherwise, re-arming after each one
    Continuous,
}

impl<SPI, CLK, TXEN, RXEN> Radio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// Starts staging a new transmit payload.
    ///
    /// Resets the FIFO pointer and the pending count and routes the RF
    /// switch to the transmitter. The operating mode is left alone, so this
    /// may be called repeatedly before [`end_transmit`](Radio::end_transmit).
    pub fn begin_transmit(&mut self) -> Result<(), Error> {
        self.device.write_register(FifoTxBaseAddr(0))?;
        self.device.write_register(FifoAddrPtr(0))?;
        self.cursor = 0;
        self.pending = 0;
        self.switch.transmit()
    }

    /// Transmits the staged payload.
    ///
    /// With `use_interrupt` set and an interrupt line configured, DIO0 is
    /// mapped to TxDone and the interrupt path is armed. Otherwise completion
    /// must be observed with [`wait`](Radio::wait).
    ///
    /// # Errors
    /// * `Error::OperationInProgress` - The chip is still transmitting. No
    ///   register or driver state was touched.
    /// * `Error::PayloadTooLarge` - More than 255 bytes are staged. Nothing
    ///   was touched; stage a shorter payload with
    ///   [`begin_transmit`](Radio::begin_transmit).
    pub fn end_transmit(&mut self, use_interrupt: bool) -> Result<(), Error> {
        let OpMode { mode, .. } = self.device.read_register()?;
        if mode == Mode::Tx {
            warn!("sx127x: transmit rejected, chip busy in {}", mode);
            return Err(Error::OperationInProgress);
        }
        let Ok(length) = u8::try_from(self.pending) else {
            warn!("sx127x: transmit rejected, {=usize} bytes staged", self.pending);
            return Err(Error::PayloadTooLarge);
        };

        self.clear_irq_flags()?;
        self.device.write_register(PayloadLength(length))?;

        self.operation = Operation::Transmit;
        self.latched = None;
        self.reported = false;
        self.tx_armed_len = self.pending;

        self.set_mode(Mode::Tx)?;
        self.tx_started = self.now_ms();
        debug!("sx127x: transmit {=usize} bytes", self.pending);

        self.irq_handler = None;
        if use_interrupt && self.irq_line.is_some() {
            self.device.write_register(DioMapping1 {
                dio0: Dio0Mapping::TxDone,
            })?;
            self.irq_handler = Some(Operation::Transmit);
        }
        Ok(())
    }

    /// Arms a receive.
    ///
    /// With `use_interrupt` set and an interrupt line configured, DIO0 is
    /// mapped to RxDone and the interrupt path is armed. Otherwise completion
    /// must be observed with [`wait`](Radio::wait).
    ///
    /// # Errors
    /// * `Error::OperationInProgress` - The chip is still receiving. No
    ///   register or driver state was touched.
    pub fn request(&mut self, timeout: RxTimeout, use_interrupt: bool) -> Result<(), Error> {
        let OpMode { mode, .. } = self.device.read_register()?;
        if mode.is_receiving() {
            warn!("sx127x: receive rejected, chip busy in {}", mode);
            return Err(Error::OperationInProgress);
        }

        self.clear_irq_flags()?;
        self.switch.receive()?;

        self.latched = None;
        self.reported = false;
        self.pending = 0;
        self.cursor = 0;

        let mode = match timeout {
            RxTimeout::Continuous => {
                self.operation = Operation::ReceiveContinuous;
                Mode::RxContinuous
            }
            RxTimeout::Single | RxTimeout::Millis(0) => {
                self.operation = Operation::Receive;
                Mode::RxContinuous
            }
            RxTimeout::Millis(ms) => {
                self.operation = Operation::Receive;
                let symbols = self.config.symbol_timeout(ms);
                debug!("sx127x: symbol timeout {=u16} for {=u32} ms", symbols, ms);
                self.device
                    .write_bits(REG_MODEM_CONFIG_2, (symbols >> 8) as u8 & 0x03, 0, 2)?;
                self.device.write_register(SymbTimeoutLsb(symbols as u8))?;
                Mode::RxSingle
            }
        };
        self.set_mode(mode)?;

        self.irq_handler = None;
        if use_interrupt && self.irq_line.is_some() {
            self.device.write_register(DioMapping1 {
                dio0: Dio0Mapping::RxDone,
            })?;
            self.irq_handler = Some(self.operation);
        }
        Ok(())
    }

    /// Blocks until the armed operation completes, polling the interrupt
    /// flags.
    ///
    /// `timeout_ms` bounds the wait; zero waits forever. On timeout the
    /// operation stays armed and can be waited on again.
    ///
    /// Returns immediately when the interrupt path already resolved the
    /// operation.
    ///
    /// # Errors
    /// * `Error::NotArmed` - Nothing armed, or the completion was already
    ///   reported by an earlier `wait`
    /// * `Error::Timeout` - The budget elapsed first
    pub fn wait(&mut self, timeout_ms: u32) -> Result<(), Error> {
        let started = self.now_ms();
        while !self.poll()? {
            if timeout_ms != 0 && self.now_ms().wrapping_sub(started) >= timeout_ms {
                debug!("sx127x: wait timed out after {=u32} ms", timeout_ms);
                return Err(Error::Timeout);
            }
        }
        Ok(())
    }

    /// One polling step of [`wait`](Radio::wait). Returns whether the armed
    /// operation is resolved.
    pub(crate) fn poll(&mut self) -> Result<bool, Error> {
        if self.operation == Operation::Idle || self.reported {
            return Err(Error::NotArmed);
        }
        if self.latched.is_some() {
            self.reported = true;
            return Ok(true);
        }

        let mask = match self.operation {
            Operation::Transmit => IrqFlags::TX_DONE,
            _ => IrqFlags::RX_COMPLETE,
        };
        let flags = self.irq_flags()?;
        if !flags.intersects(mask) {
            return Ok(false);
        }

        trace!("sx127x: polled completion {=u8:#x}", flags.bits());
        self.complete(flags)?;
        self.reported = true;
        Ok(true)
    }

    /// Status of the last armed operation.
    ///
    /// In continuous receive a terminal status is reported once; the next
    /// call reports [`OperationStatus::RxContinuous`] until another packet
    /// completes.
    pub fn status(&mut self) -> OperationStatus {
        let waiting = match self.operation {
            Operation::Idle => OperationStatus::Idle,
            Operation::Transmit => OperationStatus::TxWait,
            Operation::Receive => OperationStatus::RxWait,
            Operation::ReceiveContinuous => OperationStatus::RxContinuous,
        };
        let status = OperationStatus::decode(self.latched, waiting);
        if self.operation == Operation::ReceiveContinuous && self.latched.is_some() {
            self.latched = None;
            self.reported = false;
        }
        status
    }

    /// Resolves the armed operation with `flags`. Shared by both completion
    /// paths; the caller checks the latch first.
    pub(crate) fn complete(&mut self, flags: IrqFlags) -> Result<(), Error> {
        self.latched = Some(flags);
        match self.operation {
            Operation::Transmit => {
                self.transmit_time = self.now_ms().wrapping_sub(self.tx_started);
                self.tx_payload_len = self.tx_armed_len;
                self.switch.release()?;
            }
            Operation::Receive => {
                self.set_mode(Mode::Standby)?;
                self.capture(flags)?;
                self.switch.release()?;
            }
            Operation::ReceiveContinuous => {
                self.capture(flags)?;
                self.clear_irq_flags()?;
            }
            Operation::Idle => {}
        }
        Ok(())
    }

    /// Points the FIFO at the received packet and records its length.
    fn capture(&mut self, flags: IrqFlags) -> Result<(), Error> {
        if !flags.contains(IrqFlags::RX_DONE) {
            self.pending = 0;
            return Ok(());
        }

        let FifoRxCurrentAddr(start) = self.device.read_register()?;
        self.device.write_register(FifoAddrPtr(start))?;
        let RxNbBytes(len) = self.device.read_register()?;
        self.cursor = start;
        self.pending = len as usize;
        trace!("sx127x: packet of {=u8} bytes at {=u8:#x}", len, start);
        Ok(())
    }
}

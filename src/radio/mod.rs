//! Transceiver driver
//!
//! [`Radio`] layers the transmit/receive lifecycle on top of the register
//! access in [`Device`]. The implementation is split by concern:
//!
//! - `config`: modulation and packet setters
//! - `buffer`: staging and draining payload bytes through the FIFO
//! - `operation`: arming transmit/receive, polled completion and status
//! - `interrupt`: the DIO0 completion path and user callbacks
//! - `metrics`: transmit time, data rate, RSSI and SNR
//!
//! # Completion paths
//! An armed operation completes through whichever of two paths sees it
//! first. [`Radio::wait`] polls the interrupt flag register;
//! [`Radio::handle_interrupt`] runs when DIO0 rises. Both latch the raw
//! flags and capture the received payload position and length. A path that
//! finds the flags already latched leaves the operation alone, so a packet
//! is never captured twice.

mod buffer;
mod config;
mod interrupt;
mod metrics;
mod operation;

pub use buffer::PayloadValue;
pub use operation::RxTimeout;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{PaPin, RadioConfig, RxGain};
use crate::pins::{NoPin, RfSwitch};
use crate::registers::{IrqFlags, IrqFlagsRegister, Mode, Modem, OpMode, Version};
use crate::{Clock, Device, Error};

/// How long reset waits for the chip to report a known version
const RESET_TIMEOUT_MS: u32 = 1000;

/// Kind of wait armed by the last transmit or receive request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Operation {
    Idle,
    Transmit,
    Receive,
    ReceiveContinuous,
}

/// SX127x transceiver
///
/// # Type Parameters
/// * `SPI` - SPI device the chip is attached to
/// * `CLK` - Millisecond time source
/// * `TXEN`, `RXEN` - RF switch control lines, [`NoPin`] when absent
pub struct Radio<SPI, CLK, TXEN = NoPin, RXEN = NoPin> {
    device: Device<SPI>,
    clock: CLK,
    switch: RfSwitch<TXEN, RXEN>,
    config: RadioConfig,
    irq_line: Option<u8>,

    operation: Operation,
    /// Flags captured by the path that resolved the operation
    latched: Option<IrqFlags>,
    /// A successful `wait` already reported the latched completion
    reported: bool,
    irq_handler: Option<Operation>,

    pending: usize,
    cursor: u8,

    tx_started: u32,
    /// Payload length of the armed transmit
    tx_armed_len: usize,
    transmit_time: u32,
    /// Payload length of the last completed transmit
    tx_payload_len: usize,

    on_transmit: Option<fn()>,
    on_receive: Option<fn()>,
}

impl<SPI, CLK> Radio<SPI, CLK> {
    /// Creates a radio without RF switch lines or interrupt line.
    ///
    /// The chip is not touched until [`begin`](Radio::begin) or one of the
    /// configuration setters is called.
    pub fn new(spi: SPI, clock: CLK) -> Self {
        Self {
            device: Device::new(spi),
            clock,
            switch: RfSwitch::none(),
            config: RadioConfig::default(),
            irq_line: None,
            operation: Operation::Idle,
            latched: None,
            reported: false,
            irq_handler: None,
            pending: 0,
            cursor: 0,
            tx_started: 0,
            tx_armed_len: 0,
            transmit_time: 0,
            tx_payload_len: 0,
            on_transmit: None,
            on_receive: None,
        }
    }

    /// Attaches TXEN/RXEN control lines of an external RF switch.
    pub fn with_rf_switch<TXEN, RXEN>(self, txen: TXEN, rxen: RXEN) -> Radio<SPI, CLK, TXEN, RXEN>
    where
        TXEN: OutputPin,
        RXEN: OutputPin,
    {
        Radio {
            device: self.device,
            clock: self.clock,
            switch: RfSwitch::new(txen, rxen),
            config: self.config,
            irq_line: self.irq_line,
            operation: self.operation,
            latched: self.latched,
            reported: self.reported,
            irq_handler: self.irq_handler,
            pending: self.pending,
            cursor: self.cursor,
            tx_started: self.tx_started,
            tx_armed_len: self.tx_armed_len,
            transmit_time: self.transmit_time,
            tx_payload_len: self.tx_payload_len,
            on_transmit: self.on_transmit,
            on_receive: self.on_receive,
        }
    }
}

impl<SPI, CLK, TXEN, RXEN> Radio<SPI, CLK, TXEN, RXEN> {
    /// Declares that DIO0 is wired to interrupt line `line`.
    ///
    /// Without an interrupt line, requests asking for interrupt-driven
    /// completion silently fall back to polling.
    pub fn with_irq_line(mut self, line: u8) -> Self {
        self.irq_line = Some(line);
        self
    }

    /// Interrupt line DIO0 is wired to, if any
    pub fn irq_line(&self) -> Option<u8> {
        self.irq_line
    }

    /// Current modulation and packet parameters
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Direct register access
    pub fn device(&mut self) -> &mut Device<SPI> {
        &mut self.device
    }
}

impl<SPI, CLK, TXEN, RXEN> Radio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// Resets the chip and applies the default setup: LoRa modem, 17 dBm on
    /// PA_BOOST, automatic gain with LNA boost.
    ///
    /// # Errors
    /// * `Error::DeviceNotFound` - The chip did not answer after reset
    pub fn begin<RST, D>(&mut self, reset: &mut RST, delay: &mut D) -> Result<(), Error>
    where
        RST: OutputPin,
        D: DelayNs,
    {
        self.reset(reset, delay)?;
        self.set_modem(Modem::LoRa)?;
        self.set_tx_power(17, PaPin::PaBoost)?;
        self.set_rx_gain(RxGain::Auto, true)?;
        Ok(())
    }

    /// Pulses the reset line and waits for the chip to report a known
    /// silicon version.
    ///
    /// # Errors
    /// * `Error::DeviceNotFound` - No known version within one second
    pub fn reset<RST, D>(&mut self, reset: &mut RST, delay: &mut D) -> Result<(), Error>
    where
        RST: OutputPin,
        D: DelayNs,
    {
        reset.set_low().map_err(|_| Error::Pin)?;
        delay.delay_ms(1);
        reset.set_high().map_err(|_| Error::Pin)?;
        delay.delay_ms(10);

        let started = self.clock.now_ms();
        loop {
            let version: Version = self.device.read_register()?;
            if version.is_known() {
                debug!("sx127x: found version {=u8:#x}", version.0);
                return Ok(());
            }
            if self.clock.now_ms().wrapping_sub(started) > RESET_TIMEOUT_MS {
                error!("sx127x: no response after reset, version {=u8:#x}", version.0);
                return Err(Error::DeviceNotFound(version.0));
            }
        }
    }

    /// Puts the chip to sleep and releases the bus.
    pub fn end(mut self) -> Result<(SPI, CLK), Error> {
        self.sleep()?;
        Ok((self.device.release(), self.clock))
    }

    /// Silicon revision
    pub fn version(&mut self) -> Result<u8, Error> {
        self.device.read_register::<Version>().map(|v| v.0)
    }

    /// Enters sleep mode.
    ///
    /// An operation still in flight is abandoned: its interrupt handler is
    /// detached and [`status`](Radio::status) goes back to idle. A completed
    /// single-shot result stays readable.
    pub fn sleep(&mut self) -> Result<(), Error> {
        self.set_mode(Mode::Sleep)?;
        self.disarm()
    }

    /// Leaves sleep by entering standby.
    pub fn wake(&mut self) -> Result<(), Error> {
        self.standby()
    }

    /// Enters standby mode, abandoning an operation still in flight like
    /// [`sleep`](Radio::sleep).
    pub fn standby(&mut self) -> Result<(), Error> {
        self.set_mode(Mode::Standby)?;
        self.disarm()
    }

    fn set_mode(&mut self, mode: Mode) -> Result<(), Error> {
        trace!("sx127x: mode {}", mode);
        self.device.write_register(OpMode {
            modem: self.config.modem,
            mode,
        })
    }

    /// Drops the interrupt handler and any unresolved or continuous
    /// operation after the chip left TX/RX behind the driver's back.
    fn disarm(&mut self) -> Result<(), Error> {
        self.irq_handler = None;
        let resolved = self.latched.is_some() && self.operation != Operation::ReceiveContinuous;
        if self.operation == Operation::Idle || resolved {
            return Ok(());
        }

        debug!("sx127x: abandoning {}", self.operation);
        self.operation = Operation::Idle;
        self.latched = None;
        self.reported = false;
        self.switch.release()
    }

    fn irq_flags(&mut self) -> Result<IrqFlags, Error> {
        let IrqFlagsRegister(flags) = self.device.read_register()?;
        Ok(flags)
    }

    fn clear_irq_flags(&mut self) -> Result<(), Error> {
        self.device.write_register(IrqFlagsRegister(IrqFlags::all()))
    }

    pub(crate) fn now_ms(&mut self) -> u32 {
        self.clock.now_ms()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::mock::{Chip, MockClock, MockPin, MockSpi};
    use crate::{OperationStatus, RxTimeout};

    pub(crate) type TestRadio = Radio<MockSpi, MockClock, MockPin, MockPin>;

    pub(crate) struct Bench {
        pub radio: TestRadio,
        pub chip: Chip,
        pub clock: MockClock,
        pub txen: MockPin,
        pub rxen: MockPin,
    }

    /// A radio on an emulated chip, clock stepping 1 ms per read
    pub(crate) fn bench() -> Bench {
        let chip = Chip::new();
        let clock = MockClock::new(1);
        let (txen, rxen) = (MockPin::default(), MockPin::default());
        let radio = Radio::new(chip.spi(), clock.clone())
            .with_rf_switch(txen.clone(), rxen.clone())
            .with_irq_line(3);
        Bench {
            radio,
            chip,
            clock,
            txen,
            rxen,
        }
    }

    /// Reset line expecting one low pulse
    fn reset_pin() -> PinMock {
        PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ])
    }

    #[test]
    fn begin_configures_lora_defaults() {
        let mut b = bench();
        let mut reset = reset_pin();
        b.radio.begin(&mut reset, &mut NoopDelay::new()).unwrap();
        reset.done();

        assert_eq!(b.chip.register(0x01), 0x81);
        // PA_BOOST, 17 dBm
        assert_eq!(b.chip.register(0x09), 0xC0 | 15);
        assert_eq!(b.chip.register(0x4D), 0x04);
        // AGC on, LNA boost
        assert_eq!(b.chip.register(0x0C), 0x03);
        assert_eq!(b.chip.register(0x26) & 0x04, 0x04);
    }

    #[test]
    fn reset_fails_without_chip() {
        let mut b = bench();
        b.chip.set_register(0x42, 0x00);
        let mut reset = reset_pin();
        assert_eq!(
            b.radio.reset(&mut reset, &mut NoopDelay::new()),
            Err(Error::DeviceNotFound(0x00))
        );
        reset.done();
        assert!(b.clock.now() > RESET_TIMEOUT_MS);
    }

    #[test]
    fn reset_accepts_sx1272() {
        let mut b = bench();
        b.chip.set_register(0x42, 0x22);
        let mut reset = reset_pin();
        b.radio.reset(&mut reset, &mut NoopDelay::new()).unwrap();
        reset.done();
        assert_eq!(b.radio.version().unwrap(), 0x22);
    }

    #[test]
    fn sleep_and_standby_keep_modem_bit() {
        let mut b = bench();
        b.radio.sleep().unwrap();
        assert_eq!(b.chip.register(0x01), 0x80);
        b.radio.wake().unwrap();
        assert_eq!(b.chip.register(0x01), 0x81);
    }

    #[test]
    fn standby_abandons_continuous_receive() {
        static RECEIVED: AtomicUsize = AtomicUsize::new(0);
        fn received() {
            RECEIVED.fetch_add(1, Ordering::SeqCst);
        }

        let mut b = bench();
        b.radio.on_receive(received);
        b.radio.request(RxTimeout::Continuous, true).unwrap();
        b.radio.standby().unwrap();

        assert_eq!(b.chip.mode(), Mode::Standby);
        assert_eq!(b.radio.status(), OperationStatus::Idle);
        assert!(!b.rxen.is_high());

        b.chip.deliver(0x00, b"late", IrqFlags::empty());
        b.radio.handle_interrupt().unwrap();
        assert_eq!(RECEIVED.load(Ordering::SeqCst), 0);
        assert_eq!(b.radio.status(), OperationStatus::Idle);
        assert_eq!(b.radio.available(), 0);
        assert_eq!(b.radio.wait(10), Err(Error::NotArmed));
    }

    #[test]
    fn sleep_abandons_pending_transmit() {
        let mut b = bench();
        b.radio.begin_transmit().unwrap();
        b.radio.write(&[7; 4]).unwrap();
        b.radio.end_transmit(true).unwrap();
        b.radio.sleep().unwrap();

        assert_eq!(b.chip.mode(), Mode::Sleep);
        assert_eq!(b.radio.status(), OperationStatus::Idle);
        assert!(!b.txen.is_high());
        b.radio.handle_interrupt().unwrap();
        assert_eq!(b.radio.status(), OperationStatus::Idle);
    }

    #[test]
    fn standby_keeps_completed_result() {
        let mut b = bench();
        b.radio.request(RxTimeout::Single, false).unwrap();
        b.chip.deliver(0x00, b"kept", IrqFlags::empty());
        b.radio.wait(0).unwrap();
        b.radio.standby().unwrap();

        assert_eq!(b.radio.status(), OperationStatus::RxDone);
        assert_eq!(b.radio.available(), 4);
    }

    #[test]
    fn end_sleeps_and_releases() {
        let b = bench();
        let chip = b.chip.clone();
        let (_spi, _clock) = b.radio.end().unwrap();
        assert_eq!(chip.mode(), Mode::Sleep);
    }
}

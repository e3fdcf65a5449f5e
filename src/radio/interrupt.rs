//! DIO0 completion path
//!
//! Arming with `use_interrupt` maps DIO0 to the operation's done event and
//! records which handler the next rising edge should run. The board's
//! interrupt vector then calls [`Radio::handle_interrupt`], directly or
//! through [`SharedRadio`](crate::SharedRadio). Async callers can instead
//! await the edge with [`Radio::wait_irq`].

use embedded_hal::digital::OutputPin;

use super::Operation;
use crate::registers::IrqFlags;
use crate::{Clock, Error, Radio};

impl<SPI, CLK, TXEN, RXEN> Radio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// Registers a function to run from the interrupt path after a
    /// transmit completes. It runs in interrupt context and must not block.
    pub fn on_transmit(&mut self, callback: fn()) {
        self.on_transmit = Some(callback);
    }

    /// Registers a function to run from the interrupt path after a receive
    /// completes. It runs in interrupt context and must not block.
    pub fn on_receive(&mut self, callback: fn()) {
        self.on_receive = Some(callback);
    }

    /// Runs the handler armed for the DIO0 rising edge.
    ///
    /// Single-shot handlers detach themselves; the continuous receive
    /// handler stays armed. An edge with no armed handler is ignored, as is
    /// a single-shot completion that [`wait`](Radio::wait) already resolved.
    pub fn handle_interrupt(&mut self) -> Result<(), Error> {
        let Some(operation) = self.irq_handler else {
            trace!("sx127x: spurious interrupt");
            return Ok(());
        };

        let continuous = operation == Operation::ReceiveContinuous;
        if !continuous {
            self.irq_handler = None;
            if self.latched.is_some() {
                trace!("sx127x: interrupt after polled completion");
                return Ok(());
            }
        }

        let flags = match operation {
            Operation::Transmit => IrqFlags::TX_DONE,
            _ => {
                let flags = self.irq_flags()?;
                // DIO0 can rise before the flag register updates
                if flags.intersects(IrqFlags::RX_EVENTS) {
                    flags
                } else {
                    IrqFlags::RX_DONE
                }
            }
        };

        trace!("sx127x: interrupt completion {=u8:#x}", flags.bits());
        self.complete(flags)?;
        if continuous {
            self.reported = false;
        }

        let callback = match operation {
            Operation::Transmit => self.on_transmit,
            _ => self.on_receive,
        };
        if let Some(callback) = callback {
            callback();
        }
        Ok(())
    }

    /// Waits for the DIO0 rising edge, then runs the interrupt path.
    ///
    /// # Errors
    /// * `Error::NotArmed` - No interrupt-driven operation is armed
    /// * `Error::Pin` - Waiting on the interrupt line failed
    pub async fn wait_irq<IRQ>(&mut self, irq: &mut IRQ) -> Result<(), Error>
    where
        IRQ: embedded_hal_async::digital::Wait,
    {
        if self.irq_handler.is_none() {
            return Err(Error::NotArmed);
        }
        irq.wait_for_rising_edge().await.map_err(|_| Error::Pin)?;
        self.handle_interrupt()
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use embedded_hal_mock::eh1::digital::{Edge, Mock as PinMock, Transaction as PinTransaction};

    use crate::radio::tests::bench;
    use crate::registers::{IrqFlags, Mode};
    use crate::{Error, OperationStatus, RxTimeout};

    #[test]
    fn transmit_interrupt_runs_callback_once() {
        static SENT: AtomicUsize = AtomicUsize::new(0);
        fn sent() {
            SENT.fetch_add(1, Ordering::SeqCst);
        }

        let mut b = bench();
        b.radio.on_transmit(sent);
        b.radio.begin_transmit().unwrap();
        b.radio.write(&[0; 8]).unwrap();
        b.radio.end_transmit(true).unwrap();

        b.chip.finish_transmit();
        b.radio.handle_interrupt().unwrap();
        b.radio.handle_interrupt().unwrap();

        assert_eq!(SENT.load(Ordering::SeqCst), 1);
        assert_eq!(b.radio.status(), OperationStatus::TxDone);
        assert!(!b.txen.is_high());
    }

    #[test]
    fn interrupt_before_wait_skips_polling() {
        let mut b = bench();
        b.radio.request(RxTimeout::Single, true).unwrap();
        b.chip.deliver(0x10, b"data", IrqFlags::empty());
        b.radio.handle_interrupt().unwrap();

        let reads = b.chip.irq_reads();
        b.radio.wait(0).unwrap();
        assert_eq!(b.chip.irq_reads(), reads);
        assert_eq!(b.radio.status(), OperationStatus::RxDone);
        assert_eq!(b.radio.available(), 4);
        assert_eq!(b.chip.mode(), Mode::Standby);

        assert_eq!(b.radio.wait(0), Err(Error::NotArmed));
    }

    #[test]
    fn interrupt_after_polled_completion_is_ignored() {
        static RECEIVED: AtomicUsize = AtomicUsize::new(0);
        fn received() {
            RECEIVED.fetch_add(1, Ordering::SeqCst);
        }

        let mut b = bench();
        b.radio.on_receive(received);
        b.radio.request(RxTimeout::Single, true).unwrap();
        b.chip.deliver(0x00, b"abc", IrqFlags::empty());
        b.radio.wait(0).unwrap();

        b.radio.purge(1);
        b.radio.handle_interrupt().unwrap();
        assert_eq!(RECEIVED.load(Ordering::SeqCst), 0);
        assert_eq!(b.radio.available(), 2);
    }

    #[test]
    fn early_edge_assumes_rx_done() {
        let mut b = bench();
        b.radio.request(RxTimeout::Single, true).unwrap();
        b.radio.handle_interrupt().unwrap();
        assert_eq!(b.radio.status(), OperationStatus::RxDone);
    }

    #[test]
    fn interrupt_reports_crc_error() {
        let mut b = bench();
        b.radio.request(RxTimeout::Millis(200), true).unwrap();
        b.chip.deliver(0x00, b"bad", IrqFlags::PAYLOAD_CRC_ERROR);
        b.radio.handle_interrupt().unwrap();
        assert_eq!(b.radio.status(), OperationStatus::CrcError);
    }

    #[test]
    fn spurious_interrupt_is_harmless() {
        let mut b = bench();
        b.radio.handle_interrupt().unwrap();
        assert_eq!(b.chip.irq_reads(), 0);
        assert_eq!(b.radio.status(), OperationStatus::Idle);

        b.radio.request(RxTimeout::Single, false).unwrap();
        b.chip.deliver(0x00, b"x", IrqFlags::empty());
        b.radio.handle_interrupt().unwrap();
        assert_eq!(b.radio.status(), OperationStatus::RxWait);
    }

    #[test]
    fn continuous_interrupt_stays_armed() {
        static RECEIVED: AtomicUsize = AtomicUsize::new(0);
        fn received() {
            RECEIVED.fetch_add(1, Ordering::SeqCst);
        }

        let mut b = bench();
        b.radio.on_receive(received);
        b.radio.request(RxTimeout::Continuous, true).unwrap();

        for n in 1..=3 {
            b.chip.deliver(0x00, &[n; 5], IrqFlags::empty());
            b.radio.handle_interrupt().unwrap();

            assert_eq!(RECEIVED.load(Ordering::SeqCst), n as usize);
            assert_eq!(b.radio.available(), 5);
            assert_eq!(b.radio.status(), OperationStatus::RxDone);
            assert_eq!(b.radio.status(), OperationStatus::RxContinuous);
        }
        assert_eq!(b.chip.mode(), Mode::RxContinuous);
    }

    #[tokio::test]
    async fn async_wait_runs_interrupt_path() {
        let mut b = bench();
        let mut irq = PinMock::new(&[PinTransaction::wait_for_edge(Edge::Rising)]);
        assert_eq!(b.radio.wait_irq(&mut irq).await, Err(Error::NotArmed));

        b.radio.begin_transmit().unwrap();
        b.radio.end_transmit(true).unwrap();
        b.chip.finish_transmit();
        b.radio.wait_irq(&mut irq).await.unwrap();
        irq.done();

        assert_eq!(b.radio.status(), OperationStatus::TxDone);
    }

    #[tokio::test]
    async fn async_wait_serves_continuous_receive() {
        let mut b = bench();
        let mut irq = PinMock::new(&[
            PinTransaction::wait_for_edge(Edge::Rising),
            PinTransaction::wait_for_edge(Edge::Rising),
        ]);
        b.radio.request(RxTimeout::Continuous, true).unwrap();

        for payload in [&b"first"[..], &b"second"[..]] {
            b.chip.deliver(0x00, payload, IrqFlags::empty());
            b.radio.wait_irq(&mut irq).await.unwrap();
            assert_eq!(b.radio.available(), payload.len());
            assert_eq!(b.radio.status(), OperationStatus::RxDone);
        }
        irq.done();
    }
}

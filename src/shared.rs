//! Sharing a radio with interrupt context
//!
//! The polled path and the interrupt path both mutate the same operation
//! state. [`SharedRadio`] keeps the radio in a critical-section guarded cell
//! so only one of them runs at a time, and [`InterruptTable`] routes an
//! interrupt line to the radio wired to it.
//!
//! # Example
//! ```ignore
//! static RADIO: SharedRadio<Spi, Millis> = SharedRadio::new();
//! static LINES: InterruptTable<2> = InterruptTable::new();
//!
//! LINES.register(DIO0_LINE, &RADIO)?;
//!
//! #[interrupt]
//! fn EXTI3() {
//!     LINES.dispatch(DIO0_LINE);
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

use crate::pins::NoPin;
use crate::{Clock, Error, Radio};

/// A radio that can be reached from both thread and interrupt context
pub struct SharedRadio<SPI, CLK, TXEN = NoPin, RXEN = NoPin> {
    cell: Mutex<RefCell<Option<Radio<SPI, CLK, TXEN, RXEN>>>>,
}

impl<SPI, CLK, TXEN, RXEN> SharedRadio<SPI, CLK, TXEN, RXEN> {
    /// An empty cell, usable in a `static`
    pub const fn new() -> Self {
        Self {
            cell: Mutex::new(RefCell::new(None)),
        }
    }

    /// Moves a radio into the cell, returning the one it replaces.
    pub fn install(&self, radio: Radio<SPI, CLK, TXEN, RXEN>) -> Option<Radio<SPI, CLK, TXEN, RXEN>> {
        critical_section::with(|cs| self.cell.borrow_ref_mut(cs).replace(radio))
    }

    /// Moves the radio out of the cell.
    pub fn take(&self) -> Option<Radio<SPI, CLK, TXEN, RXEN>> {
        critical_section::with(|cs| self.cell.borrow_ref_mut(cs).take())
    }

    /// Runs `f` on the radio inside a critical section.
    ///
    /// # Errors
    /// * `Error::NotInstalled` - The cell is empty
    pub fn with<R>(&self, f: impl FnOnce(&mut Radio<SPI, CLK, TXEN, RXEN>) -> R) -> Result<R, Error> {
        critical_section::with(|cs| {
            self.cell
                .borrow_ref_mut(cs)
                .as_mut()
                .map(f)
                .ok_or(Error::NotInstalled)
        })
    }
}

impl<SPI, CLK, TXEN, RXEN> Default for SharedRadio<SPI, CLK, TXEN, RXEN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SPI, CLK, TXEN, RXEN> SharedRadio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// [`Radio::wait`] for a shared radio.
    ///
    /// Each polling step runs in its own critical section, so the interrupt
    /// path can resolve the operation between steps.
    pub fn wait(&self, timeout_ms: u32) -> Result<(), Error> {
        let started = self.with(|radio| radio.now_ms())?;
        loop {
            let (done, now) = self.with(|radio| radio.poll().map(|done| (done, radio.now_ms())))??;
            if done {
                return Ok(());
            }
            if timeout_ms != 0 && now.wrapping_sub(started) >= timeout_ms {
                return Err(Error::Timeout);
            }
        }
    }

    /// Runs the interrupt path. Errors cannot be reported from interrupt
    /// context; they are logged and surface later through `status`.
    pub fn on_interrupt(&self) {
        match self.with(|radio| radio.handle_interrupt()) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("sx127x: interrupt handling failed: {}", e),
            Err(e) => warn!("sx127x: interrupt with no radio: {}", e),
        }
    }
}

/// Something an interrupt line can be routed to
pub trait InterruptTarget {
    fn on_interrupt(&self);
}

impl<SPI, CLK, TXEN, RXEN> InterruptTarget for SharedRadio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    fn on_interrupt(&self) {
        SharedRadio::on_interrupt(self)
    }
}

type Slot = Option<(u8, &'static (dyn InterruptTarget + Sync))>;

/// Routes interrupt lines to up to `N` targets
pub struct InterruptTable<const N: usize> {
    slots: Mutex<RefCell<[Slot; N]>>,
}

impl<const N: usize> InterruptTable<N> {
    /// An empty table, usable in a `static`
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([None; N])),
        }
    }

    /// Routes `line` to `target`, replacing any earlier target of that line.
    ///
    /// # Errors
    /// * `Error::RegistryFull` - All `N` slots are taken by other lines
    pub fn register(
        &self,
        line: u8,
        target: &'static (dyn InterruptTarget + Sync),
    ) -> Result<(), Error> {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let index = slots
                .iter()
                .position(|slot| matches!(slot, Some((l, _)) if *l == line))
                .or_else(|| slots.iter().position(Option::is_none))
                .ok_or(Error::RegistryFull)?;
            slots[index] = Some((line, target));
            debug!("sx127x: interrupt line {=u8} registered", line);
            Ok(())
        })
    }

    /// Removes the route of `line`. Returns whether one existed.
    pub fn unregister(&self, line: u8) -> bool {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            match slots
                .iter_mut()
                .find(|slot| matches!(slot, Some((l, _)) if *l == line))
            {
                Some(slot) => {
                    *slot = None;
                    true
                }
                None => false,
            }
        })
    }

    /// Runs the target routed to `line`. Call from the interrupt vector.
    /// Returns whether a target was found.
    pub fn dispatch(&self, line: u8) -> bool {
        let target = critical_section::with(|cs| {
            self.slots
                .borrow_ref(cs)
                .iter()
                .flatten()
                .find(|(l, _)| *l == line)
                .map(|(_, target)| *target)
        });

        match target {
            Some(target) => {
                target.on_interrupt();
                true
            }
            None => {
                trace!("sx127x: no target for line {=u8}", line);
                false
            }
        }
    }
}

impl<const N: usize> Default for InterruptTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

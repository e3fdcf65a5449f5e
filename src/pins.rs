//! RF switch control lines
//!
//! Many modules route the antenna through an external RF switch driven by
//! a TXEN and an RXEN line. Both are optional; boards without a switch use
//! [`NoPin`].

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::Error;

/// Placeholder for a control line that is not wired
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Path {
    Tx,
    Rx,
}

/// TXEN/RXEN pair
///
/// The lines are only driven when both are present, matching boards where
/// the switch needs both levels set. The line asserted last is remembered so
/// that completion can release it without knowing which operation ran.
pub struct RfSwitch<TXEN, RXEN> {
    txen: Option<TXEN>,
    rxen: Option<RXEN>,
    active: Option<Path>,
}

impl RfSwitch<NoPin, NoPin> {
    /// A switch with no control lines
    pub fn none() -> Self {
        Self {
            txen: None,
            rxen: None,
            active: None,
        }
    }
}

impl<TXEN, RXEN> RfSwitch<TXEN, RXEN>
where
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// A switch driven by both lines
    pub fn new(txen: TXEN, rxen: RXEN) -> Self {
        Self {
            txen: Some(txen),
            rxen: Some(rxen),
            active: None,
        }
    }

    /// Routes the antenna to the transmitter
    pub fn transmit(&mut self) -> Result<(), Error> {
        if let (Some(txen), Some(rxen)) = (self.txen.as_mut(), self.rxen.as_mut()) {
            rxen.set_low().map_err(|_| Error::Pin)?;
            txen.set_high().map_err(|_| Error::Pin)?;
            self.active = Some(Path::Tx);
        }
        Ok(())
    }

    /// Routes the antenna to the receiver
    pub fn receive(&mut self) -> Result<(), Error> {
        if let (Some(txen), Some(rxen)) = (self.txen.as_mut(), self.rxen.as_mut()) {
            txen.set_low().map_err(|_| Error::Pin)?;
            rxen.set_high().map_err(|_| Error::Pin)?;
            self.active = Some(Path::Rx);
        }
        Ok(())
    }

    /// De-asserts whichever line was asserted last
    pub fn release(&mut self) -> Result<(), Error> {
        let released = match self.active {
            Some(Path::Tx) => self.txen.as_mut().map_or(true, |pin| pin.set_low().is_ok()),
            Some(Path::Rx) => self.rxen.as_mut().map_or(true, |pin| pin.set_low().is_ok()),
            None => true,
        };
        if released {
            Ok(())
        } else {
            Err(Error::Pin)
        }
    }

    /// Returns the control lines
    pub fn free(self) -> (Option<TXEN>, Option<RXEN>) {
        (self.txen, self.rxen)
    }
}

//! Millisecond time source

/// Monotonic millisecond counter
///
/// Supplies the equivalent of a board's `millis()` tick. The counter is
/// allowed to wrap; the driver only ever uses wrapping differences.
pub trait Clock {
    /// Current time in milliseconds
    fn now_ms(&mut self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&mut self) -> u32 {
        T::now_ms(self)
    }
}

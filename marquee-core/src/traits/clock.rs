//! Monotonic time source

/// Monotonic microsecond clock
///
/// Used by the render task to measure the interval between presented
/// frames. Must never go backwards.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_micros(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}

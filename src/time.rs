//! Millisecond countdown timers.
//!
//! Every deadline in this crate is measured against a [`Clock`] supplied by the
//! platform. On hosted targets [`StdClock`] is available behind the `std`
//! feature; embedded targets implement [`Clock`] over their tick counter.

/// A monotonic millisecond time source.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Clock backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Creates a clock whose origin is the current instant.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A countdown armed for a number of milliseconds.
///
/// A timer lives for the duration of one I/O operation. Once armed,
/// [`remaining_ms`](Timer::remaining_ms) only decreases and
/// [`expired`](Timer::expired) stays true until the timer is re-armed.
///
/// # Examples
///
/// ```rust
/// use core::cell::Cell;
/// use mqttcloud::time::{Clock, Timer};
///
/// struct Manual(Cell<u64>);
/// impl Clock for Manual {
///     fn now_ms(&self) -> u64 { self.0.get() }
/// }
///
/// let clock = Manual(Cell::new(1_000));
/// let mut timer = Timer::new(&clock);
/// timer.start(50);
/// assert_eq!(timer.remaining_ms(), 50);
///
/// clock.0.set(1_050);
/// assert!(timer.expired());
/// assert_eq!(timer.remaining_ms(), 0);
/// ```
#[derive(Debug)]
pub struct Timer<'c, C: Clock + ?Sized> {
    clock: &'c C,
    deadline: u64,
}

impl<'c, C: Clock + ?Sized> Timer<'c, C> {
    /// Creates a timer that is already expired.
    pub fn new(clock: &'c C) -> Self {
        let deadline = clock.now_ms();
        Self { clock, deadline }
    }

    /// Arms the timer to expire `duration_ms` from now, replacing any earlier arming.
    pub fn start(&mut self, duration_ms: u32) {
        self.deadline = self.clock.now_ms().saturating_add(u64::from(duration_ms));
    }

    /// Returns `true` once the armed deadline has been reached.
    pub fn expired(&self) -> bool {
        self.clock.now_ms() >= self.deadline
    }

    /// Milliseconds left until the deadline, never negative.
    pub fn remaining_ms(&self) -> u32 {
        let left = self.deadline.saturating_sub(self.clock.now_ms());
        u32::try_from(left).unwrap_or(u32::MAX)
    }
}

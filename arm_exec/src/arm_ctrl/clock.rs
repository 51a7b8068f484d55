//! Millisecond clocks driving the convergence cadence

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic millisecond counter which wraps at `u32::MAX`.
///
/// Consumers must only ever compare readings with
/// [`util::time::elapsed_millis`], never by absolute value.
pub trait Clock {
    fn millis(&self) -> u32;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock counting milliseconds since it was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

/// Clock which only moves when told to.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<u32>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn millis(&self) -> u32 {
        // Truncation is the wrap
        self.start.elapsed().as_millis() as u32
    }
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn starting_at(ms: u32) -> Self {
        let clock = Self::default();
        clock.set(ms);
        clock
    }

    pub(crate) fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub(crate) fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn millis(&self) -> u32 {
        self.now.get()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::starting_at(u32::MAX - 1);
        let other = clock.clone();

        clock.advance(3);
        assert_eq!(other.millis(), 1);

        other.set(40);
        assert_eq!(clock.millis(), 40);
    }

    #[test]
    fn test_monotonic_clock() {
        let clock = MonotonicClock::new();
        let a = clock.millis();
        let b = clock.millis();
        assert!(util::time::elapsed_millis(b, a) < 1000);
    }
}

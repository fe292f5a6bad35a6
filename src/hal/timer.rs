//! Timer Abstractions
//!
//! Monotonic millisecond time source used to rate-limit status reads.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin; never decreases
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embedded")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embedded")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for EmbassyClock {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "EmbassyClock({}ms)", self.now_ms());
    }
}

/// Elapsed-time gate: open once `interval_ms` has passed since the last mark
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimiter {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl RateLimiter {
    /// Create a limiter that has never fired
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Whether an event at `now_ms` is still inside the interval
    #[must_use]
    pub fn is_limited(&self, now_ms: u64) -> bool {
        match self.last_ms {
            Some(last) => now_ms.saturating_sub(last) < self.interval_ms,
            None => false,
        }
    }

    /// Record an event at `now_ms`
    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    /// Forget the last mark so the next check is open
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

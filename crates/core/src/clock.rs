//! Time sources for the write path.
//!
//! `updatedAt` is the only ordering key of the inventory collection, so the
//! writer must never hand out the same millisecond twice.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Wall-clock source in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// System clock (`chrono::Utc::now()`).
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock adapter that issues strictly increasing values.
///
/// Returns `max(inner.now_millis(), last + 1)`.
#[derive(Debug)]
pub struct MonotonicClock<C> {
    inner: C,
    last: AtomicI64,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: AtomicI64::new(i64::MIN),
        }
    }
}

impl Default for MonotonicClock<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now_millis(&self) -> i64 {
        let now = self.inner.now_millis();
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let next = if prev == i64::MIN { now } else { now.max(prev + 1) };
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FrozenClock(i64);

    impl Clock for FrozenClock {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn frozen_time_still_advances() {
        let clock = MonotonicClock::new(FrozenClock(1_000));
        assert_eq!(clock.now_millis(), 1_000);
        assert_eq!(clock.now_millis(), 1_001);
        assert_eq!(clock.now_millis(), 1_002);
    }

    #[test]
    fn follows_wall_clock_when_it_is_ahead() {
        let clock = MonotonicClock::new(SystemClock);
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b > a);
        assert!(a >= 1_600_000_000_000);
    }
}

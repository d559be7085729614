//! Time sources for window rotation.
//!
//! Rotation only ever compares instants handed out by one clock, so any
//! monotonic source works. Tests drive a [`ManualClock`] instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// The current instant. Must never go backwards.
    fn now(&self) -> Instant;
}

/// The process' monotonic clock, `Instant::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same offset, so a test keeps one handle and gives the
/// other to the structure under test.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use summary_quantiles::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// let start = clock.now();
///
/// handle.advance(Duration::from_secs(5));
/// assert_eq!(Duration::from_secs(5), clock.now() - start);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock frozen at the moment of construction
    pub fn new() -> ManualClock {
        ManualClock {
            base: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move the clock forward by `duration`
    pub fn advance(&self, duration: Duration) {
        self.offset_nanos
            .fetch_add(nanos_to_u64(duration), Ordering::SeqCst);
    }

    /// Put the clock at `offset` past its construction instant
    ///
    /// Setting an offset smaller than the current one moves the clock
    /// backwards, which rotation treats as no time having passed.
    pub fn set(&self, offset: Duration) {
        self.offset_nanos
            .store(nanos_to_u64(offset), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let nanos = self.offset_nanos.load(Ordering::SeqCst);
        self.base
            .checked_add(Duration::from_nanos(nanos))
            .unwrap_or(self.base)
    }
}

fn nanos_to_u64(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

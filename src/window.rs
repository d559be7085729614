//! 'window' decays a [`CKMS`] sketch so that it reflects a trailing span of
//! time rather than everything ever inserted.
//!
//! A ring of `age_buckets` sketches is kept, every one of them fed with every
//! inserted value. They were started at staggered moments, one rotation
//! interval (`max_age / age_buckets`) apart. Queries go to the oldest bucket,
//! the 'current' one. When a rotation interval elapses the current bucket is
//! reset, becomes the freshest, and the next oldest takes its place. No
//! bucket ever holds more than `max_age` of history and no per-observation
//! timestamps are stored. The price is resolution: data leaves the window in
//! steps of one rotation interval.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use summary_quantiles::{ManualClock, Quantile, TimeWindowQuantiles};
//!
//! let clock = ManualClock::new();
//! let quantiles = vec![Quantile::new(0.5, 0.05).unwrap()];
//! let mut window =
//!     TimeWindowQuantiles::new(quantiles.into(), Duration::from_secs(60), 5, clock.clone())
//!         .unwrap();
//!
//! window.insert(1.0);
//! assert_eq!(Some(1.0), window.get(0.5));
//!
//! clock.advance(Duration::from_secs(61));
//! window.insert(2.0);
//! assert_eq!(Some(2.0), window.get(0.5));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ckms::{Quantile, CKMS};
use crate::clock::{Clock, MonotonicClock};
use crate::error::{Error, Result};

/// A ring of CKMS sketches giving a sliding-window view of a stream.
#[derive(Debug, Clone)]
pub struct TimeWindowQuantiles<C = MonotonicClock> {
    buckets: Vec<CKMS>,
    current_bucket: usize,
    last_rotation: Instant,
    rotation_interval: Duration,
    clock: C,
}

impl<C: Clock> TimeWindowQuantiles<C> {
    /// Create a window over the trailing `max_age`, split into `age_buckets`
    ///
    /// Fails if `age_buckets` is zero or if `max_age / age_buckets` is zero.
    pub fn new(
        quantiles: Arc<[Quantile]>,
        max_age: Duration,
        age_buckets: u32,
        clock: C,
    ) -> Result<TimeWindowQuantiles<C>> {
        if age_buckets == 0 {
            return Err(Error::InvalidAgeBuckets);
        }
        let rotation_interval = max_age / age_buckets;
        if rotation_interval.is_zero() {
            return Err(Error::InvalidMaxAge(max_age));
        }

        let buckets = (0..age_buckets)
            .map(|_| CKMS::new(Arc::clone(&quantiles)))
            .collect();
        let last_rotation = clock.now();
        Ok(TimeWindowQuantiles {
            buckets,
            current_bucket: 0,
            last_rotation,
            rotation_interval,
            clock,
        })
    }

    /// Insert a value into every bucket
    ///
    /// Each bucket started at a different moment and must hold everything
    /// seen since, so that whichever becomes current next covers exactly its
    /// share of the window.
    pub fn insert(&mut self, v: f64) {
        self.rotate();
        for bucket in self.buckets.iter_mut() {
            bucket.insert(v);
        }
    }

    /// Query the current bucket for an approximate quantile
    ///
    /// Returns `None` when nothing was inserted within the window.
    pub fn get(&mut self, q: f64) -> Option<f64> {
        self.rotate().get(q)
    }

    /// Rotate, then hand out the current bucket
    ///
    /// Lets a reader answer several quantiles from one bucket even if a
    /// rotation boundary passes while it reads.
    pub(crate) fn current(&mut self) -> &mut CKMS {
        self.rotate()
    }

    /// Number of observations the current bucket covers
    pub fn count(&mut self) -> usize {
        self.rotate().count()
    }

    /// The time between two rotations, `max_age / age_buckets`
    pub fn rotation_interval(&self) -> Duration {
        self.rotation_interval
    }

    /// Number of buckets in the ring
    pub fn age_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// The quantiles the buckets are accurate for
    pub fn quantiles(&self) -> &[Quantile] {
        self.buckets[self.current_bucket].quantiles()
    }

    fn rotate(&mut self) -> &mut CKMS {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_rotation);
        if elapsed >= self.rotation_interval {
            let len = self.buckets.len();
            let interval = self.rotation_interval.as_nanos();
            let steps = elapsed.as_nanos() / interval;

            // Past a full turn of the ring every bucket is empty anyway, only
            // the cursor keeps moving.
            let resets = steps.min(len as u128) as usize;
            for _ in 0..resets {
                self.buckets[self.current_bucket].reset();
                self.current_bucket = (self.current_bucket + 1) % len;
            }
            let idle = ((steps - resets as u128) % len as u128) as usize;
            self.current_bucket = (self.current_bucket + idle) % len;

            let remainder = u64::try_from(elapsed.as_nanos() % interval).unwrap_or(u64::MAX);
            self.last_rotation = now
                .checked_sub(Duration::from_nanos(remainder))
                .unwrap_or(now);
            trace!(
                "window rotated {} step(s), current bucket {}",
                steps,
                self.current_bucket
            );
        }
        &mut self.buckets[self.current_bucket]
    }
}

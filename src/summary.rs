//! 'summary' tracks the count, the sum and a set of sliding-window quantiles
//! of observed values, the three things a metrics summary exports.
//!
//! All state sits behind one lock. Collecting reads count, sum and every
//! quantile at a single point in time, so an exporter never sees a count that
//! disagrees with the sum or the quantiles it was reported with.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::ckms::Quantile;
use crate::clock::{Clock, MonotonicClock};
use crate::error::{Error, Result};
use crate::window::TimeWindowQuantiles;

/// Window length used unless configured otherwise.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);
/// Ring size used unless configured otherwise.
pub const DEFAULT_AGE_BUCKETS: u32 = 5;

/// Configuration of a [`Summary`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use summary_quantiles::{Quantile, Summary, SummaryOpts};
///
/// let opts = SummaryOpts::default()
///     .quantile(Quantile::new(0.5, 0.05).unwrap())
///     .quantile(Quantile::new(0.99, 0.001).unwrap())
///     .max_age(Duration::from_secs(600))
///     .age_buckets(10);
/// let summary = Summary::with_opts(opts).unwrap();
/// assert_eq!(2, summary.quantiles().len());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct SummaryOpts {
    /// Quantiles to report, in reporting order.
    pub quantiles: Vec<Quantile>,
    /// How far back observations count toward the quantiles.
    pub max_age: Duration,
    /// Number of steps in which observations leave the window.
    pub age_buckets: u32,
}

impl SummaryOpts {
    /// Options for `quantiles` with the default window
    pub fn new(quantiles: Vec<Quantile>) -> SummaryOpts {
        SummaryOpts {
            quantiles,
            ..SummaryOpts::default()
        }
    }

    /// Add a quantile to report
    pub fn quantile(mut self, quantile: Quantile) -> SummaryOpts {
        self.quantiles.push(quantile);
        self
    }

    /// Set the window length
    pub fn max_age(mut self, max_age: Duration) -> SummaryOpts {
        self.max_age = max_age;
        self
    }

    /// Set the number of age buckets
    pub fn age_buckets(mut self, age_buckets: u32) -> SummaryOpts {
        self.age_buckets = age_buckets;
        self
    }
}

impl Default for SummaryOpts {
    fn default() -> SummaryOpts {
        SummaryOpts {
            quantiles: Vec::new(),
            max_age: DEFAULT_MAX_AGE,
            age_buckets: DEFAULT_AGE_BUCKETS,
        }
    }
}

/// A consistent reading of a [`Summary`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// Observations since creation.
    pub count: f64,
    /// Sum of observations since creation.
    pub sum: f64,
    /// `(quantile, value)` per configured quantile, in configured order.
    /// The value is NaN when nothing was observed within the window.
    pub quantiles: Vec<(f64, f64)>,
}

impl Snapshot {
    /// The value reported for a configured quantile
    ///
    /// Quantiles that were not configured are not answered, as the sketch
    /// made no accuracy promise for them.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        self.quantiles
            .iter()
            .find(|&&(quantile, _)| quantile == q)
            .map(|&(_, value)| value)
    }
}

#[derive(Debug)]
struct Inner<C> {
    count: f64,
    sum: f64,
    window: TimeWindowQuantiles<C>,
}

/// Count, sum and sliding-window quantiles of observed values.
///
/// `Summary` is `Sync`; share it behind an `Arc` between any number of
/// observing and collecting threads.
#[derive(Debug)]
pub struct Summary<C = MonotonicClock> {
    quantiles: Arc<[Quantile]>,
    inner: Mutex<Inner<C>>,
}

impl Summary<MonotonicClock> {
    /// Create a summary over the trailing `max_age`, decayed in
    /// `age_buckets` steps
    pub fn new(quantiles: Vec<Quantile>, max_age: Duration, age_buckets: u32) -> Result<Summary> {
        Summary::with_opts(SummaryOpts {
            quantiles,
            max_age,
            age_buckets,
        })
    }

    /// Create a summary from `opts`
    pub fn with_opts(opts: SummaryOpts) -> Result<Summary> {
        Summary::with_clock(opts, MonotonicClock)
    }
}

impl<C: Clock> Summary<C> {
    /// Create a summary whose window is driven by `clock`
    ///
    /// Fails if a quantile is configured twice or the window cannot be split
    /// into the requested buckets.
    pub fn with_clock(opts: SummaryOpts, clock: C) -> Result<Summary<C>> {
        for (i, q) in opts.quantiles.iter().enumerate() {
            if opts.quantiles[..i]
                .iter()
                .any(|p| p.quantile() == q.quantile())
            {
                return Err(Error::DuplicateQuantile(q.quantile()));
            }
        }

        let quantiles: Arc<[Quantile]> = opts.quantiles.into();
        let window = TimeWindowQuantiles::new(
            Arc::clone(&quantiles),
            opts.max_age,
            opts.age_buckets,
            clock,
        )?;
        debug!(
            "summary created: quantiles={} max_age={:?} age_buckets={}",
            quantiles.len(),
            opts.max_age,
            opts.age_buckets
        );
        Ok(Summary {
            quantiles,
            inner: Mutex::new(Inner {
                count: 0.0,
                sum: 0.0,
                window,
            }),
        })
    }

    /// Record a value
    ///
    /// NaN and infinite values are dropped: they have no rank and would
    /// poison the sum.
    pub fn observe(&self, v: f64) {
        if !v.is_finite() {
            warn!("summary dropped non-finite observation {}", v);
            return;
        }
        let mut inner = self.inner.lock();
        inner.count += 1.0;
        inner.sum += v;
        inner.window.insert(v);
    }

    /// Read count, sum and every configured quantile
    ///
    /// Not a pure read: the window may rotate. Rotation happens once, up
    /// front, so every quantile of the snapshot comes from the same bucket.
    pub fn collect(&self) -> Snapshot {
        let mut inner = self.inner.lock();
        let bucket = inner.window.current();
        let quantiles = self
            .quantiles
            .iter()
            .map(|q| {
                let value = bucket.get(q.quantile()).unwrap_or(f64::NAN);
                (q.quantile(), value)
            })
            .collect();
        Snapshot {
            count: inner.count,
            sum: inner.sum,
            quantiles,
        }
    }

    /// The configured quantiles, in reporting order
    pub fn quantiles(&self) -> &[Quantile] {
        &self.quantiles
    }
}

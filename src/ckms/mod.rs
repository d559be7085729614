//! This is an implementation of the algorithm presented in Cormode, Korn,
//! Muthukrishnan, Srivastava's paper "Effective Computation of Biased Quantiles
//! over Data Streams". The ambition here is to approximate quantiles on a
//! stream of data without having a boatload of information kept in memory.
//!
//! The 'targeted quantiles' error function is used: each configured
//! [`Quantile`] contributes an error band that is tight around its own rank
//! and loose elsewhere, and the sketch honours the minimum of all bands. One
//! sketch therefore answers p50 with a 5% rank error and p99 with a 0.1% rank
//! error at the same time, without paying the p99 price across the whole
//! distribution.
//!
//! Quantiles outside the configured set can be queried but carry no accuracy
//! guarantee.
use std::sync::Arc;

mod entry;
mod quantile;
mod store;

pub use self::quantile::Quantile;
use self::store::Store;

/// Values buffered before they are merged into the sample.
pub const BUFFER_CAPACITY: usize = 500;

/// A structure to provide approximate quantile queries in bounded memory and
/// with bounded, per-quantile rank error.
#[derive(Clone, Debug)]
pub struct CKMS {
    // We follow the 'batch' method of the paper. Incoming values are
    // buffered and, once BUFFER_CAPACITY of them are held, sorted and merged
    // into 'samples' in one linear pass. The merge leaves mergeable points
    // behind, which the COMPRESS operation that follows removes.
    buffer: Vec<f64>,

    // This is the S(n) of the above paper.
    samples: Store,
}

impl CKMS {
    /// Create a new CKMS satisfying every quantile in `quantiles`
    ///
    /// The quantile set is shared, not copied, so many sketches can be built
    /// from the same configuration.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use summary_quantiles::ckms::CKMS;
    /// use summary_quantiles::Quantile;
    ///
    /// let quantiles: Arc<[Quantile]> = vec![Quantile::new(0.5, 0.01).unwrap()].into();
    /// let mut ckms = CKMS::new(Arc::clone(&quantiles));
    /// for i in 1..1001 {
    ///     ckms.insert(i as f64);
    /// }
    /// let median = ckms.get(0.5).unwrap();
    /// assert!((490.0..=510.0).contains(&median));
    /// ```
    pub fn new(quantiles: Arc<[Quantile]>) -> CKMS {
        CKMS {
            buffer: Vec::with_capacity(BUFFER_CAPACITY),
            samples: Store::new(quantiles),
        }
    }

    /// Insert a value into the CKMS
    ///
    /// The value is buffered. Every `BUFFER_CAPACITY` inserts the buffer is
    /// merged into the sample and the sample compressed, so the cost per
    /// insert is amortized constant.
    pub fn insert(&mut self, v: f64) {
        self.buffer.push(v);
        if self.buffer.len() >= BUFFER_CAPACITY {
            self.flush();
        }
    }

    /// Query CKMS for an approximate quantile
    ///
    /// Any buffered values are merged first. Returns `None` if nothing has
    /// been inserted since construction or the last reset.
    ///
    /// # Examples
    /// ```
    /// use summary_quantiles::ckms::CKMS;
    /// use summary_quantiles::Quantile;
    ///
    /// let mut ckms = CKMS::new(vec![Quantile::new(0.9, 0.01).unwrap()].into());
    /// assert_eq!(None, ckms.get(0.9));
    ///
    /// ckms.insert(3.0);
    /// assert_eq!(Some(3.0), ckms.get(0.9));
    /// ```
    pub fn get(&mut self, q: f64) -> Option<f64> {
        self.flush();
        self.samples.query(q)
    }

    /// Drop everything inserted so far, keeping the quantile set
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.samples.clear();
    }

    /// Query CKMS for the count of its points
    ///
    /// This function returns the total number of points inserted since
    /// construction or the last reset, _not_ the number of points currently
    /// stored in the structure.
    ///
    /// # Examples
    /// ```
    /// use summary_quantiles::ckms::CKMS;
    /// use summary_quantiles::Quantile;
    ///
    /// let mut ckms = CKMS::new(vec![Quantile::new(0.5, 0.001).unwrap()].into());
    /// for i in 0..1000 {
    ///     ckms.insert(i as f64);
    /// }
    ///
    /// assert_eq!(ckms.count(), 1000);
    /// ```
    pub fn count(&self) -> usize {
        self.samples.count() + self.buffer.len()
    }

    /// Number of points currently retained in the sample, excluding the
    /// insertion buffer
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing has been inserted since construction or reset
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.samples.is_empty()
    }

    /// The quantiles this sketch is accurate for
    pub fn quantiles(&self) -> &[Quantile] {
        self.samples.quantiles()
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.buffer.sort_by(f64::total_cmp);
        self.samples.merge(&self.buffer);
        self.buffer.clear();
        self.samples.compress();
        trace!(
            "ckms flushed: count={} retained={}",
            self.samples.count(),
            self.samples.len()
        );
    }
}

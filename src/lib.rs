//! This crate provides approximate quantiles over a sliding window of a data
//! stream, in the shape a metrics "summary" needs them.
//!
//! Exact order statistics over an unbounded stream need unbounded memory. The
//! [`ckms::CKMS`] sketch trades exactness for a rank error that is bounded per
//! configured quantile, [`window::TimeWindowQuantiles`] decays old
//! observations by rotating a ring of such sketches, and [`summary::Summary`]
//! puts a running count and sum next to the window behind a single lock.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use summary_quantiles::{Quantile, Summary};
//!
//! let quantiles = vec![Quantile::new(0.5, 0.05)?, Quantile::new(0.9, 0.01)?];
//! let summary = Summary::new(quantiles, Duration::from_secs(60), 5)?;
//! for i in 1..101 {
//!     summary.observe(i as f64);
//! }
//!
//! let snapshot = summary.collect();
//! assert_eq!(100.0, snapshot.count);
//! assert_eq!(5050.0, snapshot.sum);
//! let p50 = snapshot.quantile(0.5).unwrap();
//! assert!((45.0..=55.0).contains(&p50));
//! # Ok::<(), summary_quantiles::Error>(())
//! ```
#![deny(
    missing_docs,
    missing_debug_implementations,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate log;

pub mod ckms;
pub mod clock;
mod error;
pub mod summary;
#[doc(hidden)]
pub mod util;
pub mod window;

pub use crate::ckms::Quantile;
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::error::{Error, Result};
pub use crate::summary::{Snapshot, Summary, SummaryOpts};
pub use crate::window::TimeWindowQuantiles;

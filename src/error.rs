//! Definition of the crate's error and result.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while configuring quantiles or a summary.
///
/// Observing and collecting never fail; everything that can go wrong is caught
/// when the configuration is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The target quantile is not strictly between 0 and 1.
    #[error("quantile must lie in (0, 1), got {0}")]
    InvalidQuantile(f64),
    /// The allowed rank error is not strictly between 0 and 1.
    #[error("quantile error must lie in (0, 1), got {0}")]
    InvalidError(f64),
    /// The same target quantile was configured more than once.
    #[error("quantile {0} is configured more than once")]
    DuplicateQuantile(f64),
    /// A sliding window needs at least one age bucket.
    #[error("age buckets must be at least 1")]
    InvalidAgeBuckets,
    /// The max age is zero, or too small to be split across the age buckets.
    #[error("max age {0:?} leaves an empty rotation interval")]
    InvalidMaxAge(Duration),
}

/// `Result` alias defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

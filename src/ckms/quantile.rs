#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A target quantile together with the rank error it may be answered with.
///
/// The coefficients of the targeted-quantiles error function are computed
/// once here, so the sketch only multiplies on its hot path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde_support",
    derive(Serialize, Deserialize),
    serde(try_from = "(f64, f64)", into = "(f64, f64)")
)]
pub struct Quantile {
    quantile: f64,
    error: f64,
    u: f64,
    v: f64,
}

impl Quantile {
    /// Create a new target quantile
    ///
    /// Both `quantile` and `error` must lie strictly between 0 and 1.
    ///
    /// # Examples
    /// ```
    /// use summary_quantiles::{Error, Quantile};
    ///
    /// let p99 = Quantile::new(0.99, 0.001).unwrap();
    /// assert_eq!(0.99, p99.quantile());
    /// assert_eq!(0.001, p99.error());
    ///
    /// assert_eq!(Err(Error::InvalidQuantile(1.0)), Quantile::new(1.0, 0.01));
    /// assert_eq!(Err(Error::InvalidError(0.0)), Quantile::new(0.5, 0.0));
    /// ```
    pub fn new(quantile: f64, error: f64) -> Result<Quantile> {
        if !(quantile > 0.0 && quantile < 1.0) {
            return Err(Error::InvalidQuantile(quantile));
        }
        if !(error > 0.0 && error < 1.0) {
            return Err(Error::InvalidError(error));
        }
        Ok(Quantile {
            quantile,
            error,
            u: 2.0 * error / (1.0 - quantile),
            v: 2.0 * error / quantile,
        })
    }

    /// The target quantile, in (0, 1).
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    /// The allowed rank error, as a fraction of the observation count.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// The error this quantile tolerates at `rank` out of `n` observations.
    ///
    /// Below the target rank the band narrows toward the top of the stream,
    /// above it toward the bottom.
    pub(crate) fn bound(&self, rank: f64, n: f64) -> f64 {
        if rank <= self.quantile * n {
            self.u * (n - rank)
        } else {
            self.v * rank
        }
    }
}

impl TryFrom<(f64, f64)> for Quantile {
    type Error = Error;

    fn try_from((quantile, error): (f64, f64)) -> Result<Quantile> {
        Quantile::new(quantile, error)
    }
}

impl From<Quantile> for (f64, f64) {
    fn from(q: Quantile) -> (f64, f64) {
        (q.quantile, q.error)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    #[test]
    fn coefficients_test() {
        let q = Quantile::new(0.5, 0.05).unwrap();
        assert!((q.u - 0.2).abs() < 1e-12);
        assert!((q.v - 0.2).abs() < 1e-12);

        let q = Quantile::new(0.9, 0.01).unwrap();
        assert!((q.u - 0.2).abs() < 1e-12);
        assert!((q.v - 0.02 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn rejects_out_of_range_test() {
        assert_eq!(Err(Error::InvalidQuantile(0.0)), Quantile::new(0.0, 0.1));
        assert_eq!(Err(Error::InvalidQuantile(-0.5)), Quantile::new(-0.5, 0.1));
        assert_eq!(Err(Error::InvalidError(1.0)), Quantile::new(0.5, 1.0));
        assert!(Quantile::new(f64::NAN, 0.1).is_err());
        assert!(Quantile::new(0.5, f64::NAN).is_err());
        assert!(Quantile::new(0.5, f64::INFINITY).is_err());
    }

    #[test]
    fn tuple_conversion_test() {
        let q = Quantile::try_from((0.75, 0.02)).unwrap();
        let pair: (f64, f64) = q.into();
        assert_eq!((0.75, 0.02), pair);
        assert!(Quantile::try_from((1.5, 0.02)).is_err());
    }

    // prop: the bound is never negative inside the domain
    #[test]
    fn bound_non_negative_test() {
        fn inner(quantile: u16, error: u16, rank: u32, extra: u32) -> TestResult {
            let quantile = f64::from(quantile % 999 + 1) / 1000.0;
            let error = f64::from(error % 999 + 1) / 1000.0;
            let q = match Quantile::new(quantile, error) {
                Ok(q) => q,
                Err(_) => return TestResult::failed(),
            };
            let n = f64::from(rank) + f64::from(extra);
            TestResult::from_bool(q.bound(f64::from(rank), n) >= 0.0)
        }
        QuickCheck::new().quickcheck(inner as fn(u16, u16, u32, u32) -> TestResult);
    }
}

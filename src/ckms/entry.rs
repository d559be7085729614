/// A retained sample point.
///
/// `g` is the difference between the lowest possible rank of this entry and
/// that of its predecessor, `delta` the width of the rank uncertainty owned by
/// this entry. Summing `g` over a prefix of the store gives a lower bound on
/// the true rank of the prefix's last value, adding its `delta` an upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub g: usize,
    pub delta: usize,
    pub v: f64,
}

impl Entry {
    pub fn new(v: f64, delta: usize) -> Entry {
        Entry { g: 1, delta, v }
    }
}

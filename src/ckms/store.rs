use std::cmp::Ordering;
use std::mem;
use std::sync::Arc;

use crate::ckms::entry::Entry;
use crate::ckms::quantile::Quantile;

/// The rank-ordered sample S(n) of the CKMS paper.
///
/// Entries are kept in a flat Vec. Values only enter through `merge`, a
/// linear pass over a sorted batch, so the per-value cost of a Vec insertion
/// never shows up.
#[derive(Clone, Debug)]
pub struct Store {
    quantiles: Arc<[Quantile]>,
    data: Vec<Entry>,
    n: usize, // total samples ever merged
}

impl Store {
    pub fn new(quantiles: Arc<[Quantile]>) -> Store {
        Store {
            quantiles,
            data: Vec::new(),
            n: 0,
        }
    }

    pub fn quantiles(&self) -> &[Quantile] {
        &self.quantiles
    }

    /// The rank error tolerated at `rank`, minimized over every target.
    ///
    /// Without any target quantile everything may be merged, so the bound is
    /// one above the count.
    pub fn allowable_error(&self, rank: f64) -> f64 {
        let n = self.n as f64;
        self.quantiles
            .iter()
            .map(|q| q.bound(rank, n))
            .fold(n + 1.0, f64::min)
    }

    /// Merge a batch of values sorted by `f64::total_cmp` into the store.
    ///
    /// Values equal to a stored value land after it. A new minimum or maximum
    /// is known exactly and gets no uncertainty. Anything in between can rank
    /// no higher than its stored successor, so it takes that successor's band
    /// `g + delta - 1`, capped at the band the error function allows at its
    /// rank. A batch landing entirely below (or above) the store is exact.
    pub fn merge(&mut self, batch: &[f64]) {
        debug_assert!(batch
            .windows(2)
            .all(|w| w[0].total_cmp(&w[1]) != Ordering::Greater));

        let mut merged = Vec::with_capacity(self.data.len() + batch.len());
        let mut existing = mem::take(&mut self.data).into_iter().peekable();
        let mut rank: usize = 0;

        for &v in batch {
            while let Some(entry) =
                existing.next_if(|e| e.v.total_cmp(&v) != Ordering::Greater)
            {
                rank += entry.g;
                merged.push(entry);
            }
            self.n += 1;
            rank += 1;
            let delta = match existing.peek() {
                Some(next) if !merged.is_empty() => {
                    let cap = (self.allowable_error(rank as f64).floor() - 1.0).max(0.0) as usize;
                    (next.g + next.delta - 1).min(cap)
                }
                _ => 0,
            };
            merged.push(Entry::new(v, delta));
        }
        merged.extend(existing);
        self.data = merged;
    }

    /// Fold entries into their successors wherever the merged band still fits
    /// the error function. The head entry is never folded, so the exact
    /// minimum survives.
    pub fn compress(&mut self) {
        if self.data.len() < 3 {
            return;
        }

        // Walking from the tail, `rank` is the prefix sum of g up to and
        // including `nxt`. Folding `cur` into `nxt` leaves it unchanged.
        let mut rank: usize = self.data.iter().map(|e| e.g).sum();
        let mut kept = Vec::with_capacity(self.data.len());
        let mut remaining = mem::take(&mut self.data).into_iter().rev();
        let mut nxt = match remaining.next() {
            Some(entry) => entry,
            None => return,
        };

        while let Some(cur) = remaining.next() {
            let is_head = remaining.len() == 0;
            let width = cur.g + nxt.g + nxt.delta;
            if !is_head && (width as f64) <= self.allowable_error(rank as f64) {
                nxt.g += cur.g;
            } else {
                rank -= nxt.g;
                kept.push(nxt);
                nxt = cur;
            }
        }
        kept.push(nxt);
        kept.reverse();
        self.data = kept;
    }

    /// The value whose rank band straddles `q * n`, or `None` when empty.
    pub fn query(&self, q: f64) -> Option<f64> {
        let last = self.data.last()?;

        let desired = q * (self.n as f64);
        let bound = desired + self.allowable_error(desired) / 2.0;

        let mut r: usize = 0;
        for pair in self.data.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            r += prev.g;
            if ((r + cur.g + cur.delta) as f64) > bound {
                return Some(prev.v);
            }
        }
        Some(last.v)
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.n = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total stored samples
    ///
    /// This value will fluctuate as compression happens.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Total samples merged since the last clear
    pub fn count(&self) -> usize {
        self.n
    }

    #[cfg(test)]
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.data.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn store(targets: &[(f64, f64)]) -> Store {
        let quantiles: Vec<Quantile> = targets
            .iter()
            .map(|&(q, e)| Quantile::new(q, e).unwrap())
            .collect();
        Store::new(quantiles.into())
    }

    #[test]
    fn merge_keeps_order_test() {
        let mut store = store(&[(0.5, 0.01)]);
        store.merge(&[1.0, 5.0, 9.0]);
        store.merge(&[0.0, 5.0, 7.0, 10.0]);

        let values: Vec<f64> = store.iter().map(|e| e.v).collect();
        assert_eq!(vec![0.0, 1.0, 5.0, 5.0, 7.0, 9.0, 10.0], values);
        assert_eq!(7, store.count());
    }

    #[test]
    fn extremes_are_exact_test() {
        let mut store = store(&[(0.5, 0.1)]);
        store.merge(&[10.0, 20.0, 30.0]);
        store.merge(&[5.0, 15.0, 25.0, 35.0]);

        let first = store.iter().next().unwrap();
        let last = store.iter().last().unwrap();
        assert_eq!((5.0, 0), (first.v, first.delta));
        assert_eq!((35.0, 0), (last.v, last.delta));
        // 15.0 and 25.0 landed between known points
        assert!(store.iter().filter(|e| e.delta > 0).count() <= 2);
    }

    #[test]
    fn merge_inherits_successor_band_test() {
        let mut wide = store(&[(0.5, 0.45)]);
        wide.data = vec![
            Entry { g: 1, delta: 0, v: 0.0 },
            Entry { g: 4, delta: 3, v: 10.0 },
            Entry { g: 1, delta: 0, v: 20.0 },
        ];
        wide.n = 6;
        wide.merge(&[5.0]);
        let entry = wide.iter().nth(1).unwrap();
        assert_eq!((5.0, 6), (entry.v, entry.delta));

        // the error function is tighter than the successor here
        let mut narrow = store(&[(0.5, 0.1)]);
        narrow.data = wide.data[..1].to_vec();
        narrow.data.extend_from_slice(&wide.data[2..]);
        narrow.n = 6;
        narrow.merge(&[5.0]);
        let entry = narrow.iter().nth(1).unwrap();
        assert_eq!((5.0, 1), (entry.v, entry.delta));
    }

    #[test]
    fn merge_below_store_is_exact_test() {
        let mut store = store(&[(0.5, 0.05), (0.9, 0.01)]);
        store.merge(&[100.0, 200.0, 300.0]);
        store.merge(&[10.0, 20.0, 30.0]);
        store.merge(&[1.0, 2.0, 3.0]);

        assert!(store.iter().all(|e| e.delta == 0));
    }

    #[test]
    fn compression_test() {
        let mut store = store(&[(0.5, 0.1)]);
        let batch: Vec<f64> = (0..10_000).map(f64::from).collect();
        store.merge(&batch);
        store.compress();

        assert_eq!(10_000, store.count());
        assert!(store.len() < 200, "len: {}", store.len());
        let g_sum: usize = store.iter().map(|e| e.g).sum();
        assert_eq!(10_000, g_sum);
        assert_eq!(Some(0.0), store.iter().next().map(|e| e.v));
        assert_eq!(Some(9_999.0), store.iter().last().map(|e| e.v));
    }

    #[test]
    fn no_targets_compress_test() {
        let mut store = store(&[]);
        let batch: Vec<f64> = (0..100).map(f64::from).collect();
        store.merge(&batch);
        store.compress();

        // only the exact minimum and the maximum survive
        assert_eq!(2, store.len());
        assert_eq!(Some(0.0), store.query(0.1));
    }

    #[test]
    fn query_empty_test() {
        let store = store(&[(0.5, 0.01)]);
        assert_eq!(None, store.query(0.5));
    }

    #[test]
    fn clear_test() {
        let mut store = store(&[(0.5, 0.01)]);
        store.merge(&[1.0, 2.0, 3.0]);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(0, store.count());
        assert_eq!(None, store.query(0.5));
    }
}

//! Small helpers shared by tests and benchmarks.
//!
//! Public only so integration tests and benches can reach it. Not part of the
//! stable API.

/// A seedable splitmix64 generator.
///
/// Reproducible input streams for tests and benchmarks without pulling a
/// random number crate into the library.
#[derive(Debug, Clone, Copy)]
pub struct Xorshift {
    seed: u64,
}

impl Xorshift {
    /// Create a generator from `seed`
    pub fn new(seed: u64) -> Xorshift {
        Xorshift { seed }
    }

    /// Next raw 64 bit output
    pub fn next_u64(&mut self) -> u64 {
        // implementation inspired by
        // https://github.com/astocko/xorshift/blob/master/src/splitmix64.rs
        use std::num::Wrapping as w;

        let mut z = w(self.seed) + w(0x9E37_79B9_7F4A_7C15_u64);
        let nxt_seed = z.0;
        z = (z ^ (z >> 30)) * w(0xBF58_476D_1CE4_E5B9_u64);
        z = (z ^ (z >> 27)) * w(0x94D0_49BB_1331_11EB_u64);
        self.seed = nxt_seed;
        (z ^ (z >> 31)).0
    }

    /// Next value, uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        // 53 high bits fill the mantissa exactly
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

//! The interval algorithm.
//!
//! Treat the bit stream as the binary digits of a uniform real `U` in
//! `[0, 1)`. After `t` bits, `U` is known to lie in a dyadic interval
//! `[alpha/D, beta/D)`. As soon as that interval fits inside a single
//! outcome's cell of the cumulative distribution, the outcome is decided.
//!
//! Every comparison is integer cross-multiplication, so sampling is exact.
//!
//! ## References
//!
//! - Han & Hoshi (1997): *Interval algorithm for random number generation*.

use crate::flip::BitStream;
use crate::search::search_nested;

/// Cumulative masses for the interval algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
    z: u64,
    cdf: Vec<u64>,
}

impl IntervalTable {
    /// `cdf` is `[0, c_1, ..., Z]` over common denominator `z`.
    pub fn new(cdf: Vec<u64>, z: u64) -> Self {
        debug_assert_eq!(cdf.last().copied(), Some(z));
        Self { z, cdf }
    }

    pub fn total(&self) -> u64 {
        self.z
    }

    pub fn cdf(&self) -> &[u64] {
        &self.cdf
    }

    /// Refine `[alpha/D, beta/D)` one bit at a time until it falls inside
    /// one cell; returns that outcome (1-indexed).
    ///
    /// # Panics
    ///
    /// Panics if the interval is still unresolved after 62 bits, which
    /// happens with probability below `n * 2^-61`.
    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        let mut alpha = 0u64;
        let mut beta = 1u64;
        let mut denominator = 1u64;
        loop {
            let b = u64::from(bits.next_bit());
            let width = beta - alpha;
            let lo = 2 * alpha + width * b;
            let hi = 2 * alpha + width * (b + 1);
            if lo % 2 == 0 && hi % 2 == 0 {
                alpha = lo / 2;
                beta = hi / 2;
            } else {
                assert!(
                    denominator < 1 << 62,
                    "IntervalTable: interval unresolved after 62 bits"
                );
                alpha = lo;
                beta = hi;
                denominator *= 2;
            }
            if let Some(j) = search_nested(&self.cdf, self.z, alpha, beta, denominator) {
                return j + 1;
            }
        }
    }
}

//! Exact Bernoulli draws by inversion.
//!
//! To flip a coin with bias `a/M`, compare a uniform real `U` against `a/M`
//! one binary digit at a time. Each round produces the next digit `y` of
//! `a/M` (by doubling the remainder) and draws the matching digit of `U`;
//! the first position where `U` has a `1` and `a/M` has digit `y` settles
//! the comparison in favour of `y`. Expected cost is two bits.

use crate::flip::BitStream;

/// Exact probability `a/M`, `0 <= a <= M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BernoulliRatio {
    a: u64,
    m: u64,
}

impl BernoulliRatio {
    /// Create the ratio `a/m`.
    ///
    /// # Panics
    ///
    /// Panics if `m == 0`, `a > m`, or `m >= 2^63` (the remainder is doubled
    /// in `u64`).
    pub fn new(a: u64, m: u64) -> Self {
        assert!(m > 0, "BernoulliRatio: denominator must be > 0");
        assert!(a <= m, "BernoulliRatio: numerator {a} exceeds denominator {m}");
        assert!(m < 1 << 63, "BernoulliRatio: denominator too large");
        Self { a, m }
    }

    /// Numerator `a`.
    pub fn numerator(&self) -> u64 {
        self.a
    }

    /// Denominator `M`.
    pub fn denominator(&self) -> u64 {
        self.m
    }

    /// Draw `true` with probability `a/M`.
    #[inline]
    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> bool {
        let m = self.m;
        let mut v = self.a;
        loop {
            v <<= 1;
            let y = if m <= v {
                v -= m;
                true
            } else {
                false
            };
            if bits.next_bit() {
                return y;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::{BitSource, ReplayBits};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn fair_coin_by_hand() {
        let half = BernoulliRatio::new(1, 2);
        // First digit of 1/2 is 1; the first bit stops immediately.
        let mut bits: ReplayBits = "1".parse().expect("bits");
        assert!(half.sample(&mut bits));
        assert_eq!(bits.consumed(), 1);
        // Otherwise every later digit of 1/2 is 0.
        let mut bits: ReplayBits = "01".parse().expect("bits");
        assert!(!half.sample(&mut bits));
        let mut bits: ReplayBits = "0001".parse().expect("bits");
        assert!(!half.sample(&mut bits));
    }

    #[test]
    fn one_third_by_hand() {
        // 1/3 = 0.010101...
        let third = BernoulliRatio::new(1, 3);
        let mut bits: ReplayBits = "1".parse().expect("bits");
        assert!(!third.sample(&mut bits));
        let mut bits: ReplayBits = "01".parse().expect("bits");
        assert!(third.sample(&mut bits));
        let mut bits: ReplayBits = "001".parse().expect("bits");
        assert!(!third.sample(&mut bits));
    }

    #[test]
    fn degenerate_ratios_are_constant() {
        let never = BernoulliRatio::new(0, 7);
        let always = BernoulliRatio::new(7, 7);
        let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(1));
        for _ in 0..1000 {
            assert!(!never.sample(&mut src));
            assert!(always.sample(&mut src));
        }
        // Two bits per draw in expectation, regardless of M.
        assert!(src.bits() < 2 * 2000 + 400, "bits={}", src.bits());
    }

    #[test]
    fn bernoulli_frequency_matches_ratio() {
        for (i, &(a, m)) in [(1u64, 2u64), (3, 8), (2, 13), (19, 21)].iter().enumerate() {
            let coin = BernoulliRatio::new(a, m);
            let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(100 + i as u64));
            let trials = 50_000;
            let ones = (0..trials).filter(|_| coin.sample(&mut src)).count();

            let p = a as f64 / m as f64;
            let expected = [trials as f64 * (1.0 - p), trials as f64 * p];
            let observed = [(trials - ones) as f64, ones as f64];
            let chi2: f64 = expected
                .iter()
                .zip(observed.iter())
                .map(|(e, o)| (o - e) * (o - e) / e)
                .sum();
            // df = 1; 99.99% quantile is ~15.1.
            assert!(chi2 < 20.0, "a={a} m={m} chi2={chi2:.2} ones={ones}");
        }
    }

    #[test]
    #[should_panic(expected = "exceeds denominator")]
    fn numerator_above_denominator_rejected() {
        let _ = BernoulliRatio::new(3, 2);
    }
}

//! Fast Dice Roller: exact uniform integers from fair bits.
//!
//! Keeps a candidate `c` uniform over `[0, v)`, doubling `v` one bit at a
//! time. Once `v >= n` the candidate is either accepted (`c < n`) or the
//! surplus range `[n, v)` is recycled as a fresh uniform of width `v - n`
//! instead of being thrown away.
//!
//! Expected bit cost is below `log2(n) + 2`.
//!
//! ## References
//!
//! - Lumbroso (2013): *Optimal Discrete Uniform Generation from Coin Flips,
//!   and Applications*. <https://arxiv.org/abs/1304.1916>

use crate::flip::BitStream;

/// Uniform sampler over `n` outcomes, labelled `1..=n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastDiceRoller {
    n: usize,
}

impl FastDiceRoller {
    /// Create a sampler over `n` outcomes.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "FastDiceRoller: n must be > 0");
        Self { n }
    }

    /// Number of outcomes.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Draw an outcome in `1..=n`.
    #[inline]
    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        let n = self.n;
        let mut v = 1usize;
        let mut c = 0usize;
        loop {
            v <<= 1;
            c = (c << 1) + usize::from(bits.next_bit());
            if n <= v {
                if c < n {
                    return c + 1;
                }
                v -= n;
                c -= n;
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
    fn four_sided_die_by_hand() {
        let die = FastDiceRoller::new(4);
        let mut bits: ReplayBits = "00".parse().expect("bits");
        assert_eq!(die.sample(&mut bits), 1);
        let mut bits: ReplayBits = "11".parse().expect("bits");
        assert_eq!(die.sample(&mut bits), 4);
        let mut bits: ReplayBits = "10".parse().expect("bits");
        assert_eq!(die.sample(&mut bits), 3);
        assert_eq!(bits.remaining(), 0);
    }

    #[test]
    fn three_sided_die_recycles_surplus() {
        // "11" lands on 3 >= n, leaving a width-1 remainder; the next bit
        // doubles it to width 2 which is still < 3, and one more decides.
        let die = FastDiceRoller::new(3);
        let mut bits: ReplayBits = "1101".parse().expect("bits");
        // v: 2, 4 -> c=3 rejected -> v=1,c=0; v=2,c=0; v=4,c=1 -> 2.
        assert_eq!(die.sample(&mut bits), 2);
        assert_eq!(bits.remaining(), 0);
    }

    #[test]
    fn single_outcome_always_one() {
        let die = FastDiceRoller::new(1);
        let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(5));
        for _ in 0..1000 {
            assert_eq!(die.sample(&mut src), 1);
        }
    }

    #[test]
    fn power_of_two_matches_raw_bits() {
        for k in 1..=10u32 {
            let die = FastDiceRoller::new(1 << k);
            let mut a = BitSource::new(ChaCha8Rng::seed_from_u64(u64::from(k)));
            let mut b = BitSource::new(ChaCha8Rng::seed_from_u64(u64::from(k)));
            for _ in 0..200 {
                let x = die.sample(&mut a);
                let y = b.next_uniform(k) as usize + 1;
                assert_eq!(x, y);
            }
            assert_eq!(a.bits(), b.bits());
        }
    }

    #[test]
    fn fdr_distribution_uniform() {
        for n in (2..20).step_by(3) {
            let die = FastDiceRoller::new(n);
            let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(n as u64));
            let trials = 20_000;
            let mut counts = vec![0usize; n];
            for _ in 0..trials {
                counts[die.sample(&mut src) - 1] += 1;
            }

            let expected = trials as f64 / n as f64;
            let chi2: f64 = counts
                .iter()
                .map(|&c| {
                    let diff = c as f64 - expected;
                    diff * diff / expected
                })
                .sum();
            // df = n-1 <= 18; generous cutoff.
            assert!(chi2 < 60.0, "n={n} chi2={chi2:.2} counts={counts:?}");
        }
    }

    #[test]
    fn expected_bits_near_optimal() {
        let n = 6;
        let die = FastDiceRoller::new(n);
        let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(17));
        let draws = 20_000;
        for _ in 0..draws {
            die.sample(&mut src);
        }
        let per_draw = src.bits() as f64 / draws as f64;
        assert!(per_draw < (n as f64).log2() + 2.0, "per_draw={per_draw}");
    }

    #[test]
    #[should_panic(expected = "n must be > 0")]
    fn zero_outcomes_rejected() {
        let _ = FastDiceRoller::new(0);
    }
}

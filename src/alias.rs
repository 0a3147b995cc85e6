//! Alias-method samplers.
//!
//! The alias method splits `n` outcomes into `n` equal buckets, each holding
//! at most two outcomes: the bucket's own outcome with probability `r_j`,
//! and an alias with probability `1 - r_j`. A draw picks a bucket uniformly
//! and flips one biased coin.
//!
//! [`AliasTable`] does both steps exactly from fair bits: the Fast Dice
//! Roller picks the bucket and Bernoulli inversion flips the coin.
//! [`ReferenceAlias`] wraps `rand_distr`'s floating-point-free
//! `WeightedAliasIndex` as a baseline; it owns its generator and does not
//! read the bit stream.
//!
//! ## References
//!
//! - Walker (1977): *An efficient method for generating discrete random
//!   variables with general distributions*.
//! - Devroye (1986): *Non-Uniform Random Variate Generation*, III.4.

use rand::rngs::StdRng;
use rand::RngCore;
use rand_distr::weighted::WeightedAliasIndex;
use rand_distr::Distribution;

use crate::bernoulli::BernoulliRatio;
use crate::error::SamplerError;
use crate::fdr::FastDiceRoller;
use crate::flip::BitStream;

/// Exact alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    dice: FastDiceRoller,
    ratios: Vec<BernoulliRatio>,
    aliases: Vec<usize>,
}

impl AliasTable {
    /// `ratios[j]` keeps bucket `j`'s own outcome `j + 1`; otherwise the
    /// draw goes to `aliases[j] + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `ratios` is empty or the two tables differ in length.
    pub fn new(ratios: Vec<BernoulliRatio>, aliases: Vec<usize>) -> Self {
        assert_eq!(
            ratios.len(),
            aliases.len(),
            "AliasTable: ratio and alias tables differ in length"
        );
        Self {
            dice: FastDiceRoller::new(ratios.len()),
            ratios,
            aliases,
        }
    }

    pub fn ratios(&self) -> &[BernoulliRatio] {
        &self.ratios
    }

    /// 0-indexed alias per bucket.
    pub fn aliases(&self) -> &[usize] {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        let j = self.dice.sample(bits);
        if self.ratios[j - 1].sample(bits) {
            j
        } else {
            self.aliases[j - 1] + 1
        }
    }
}

/// `rand_distr` alias sampler over integer weights.
#[derive(Debug, Clone)]
pub struct ReferenceAlias<R = StdRng> {
    rng: R,
    index: WeightedAliasIndex<u64>,
}

impl<R: RngCore> ReferenceAlias<R> {
    pub fn new(weights: &[u64], rng: R) -> Result<Self, SamplerError> {
        let index = WeightedAliasIndex::new(weights.to_vec())
            .map_err(|e| SamplerError::Reference(e.to_string()))?;
        Ok(Self { rng, index })
    }

    /// Draw an outcome (1-indexed) from the sampler's own generator.
    pub fn draw(&mut self) -> usize {
        self.index.sample(&mut self.rng) + 1
    }
}

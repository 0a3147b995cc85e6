//! Rejection samplers over a power-of-two proposal.
//!
//! Each sampler here draws from an easy proposal and throws away draws that
//! land outside the target's mass:
//!
//! - [`RejectionUniform`]: pick an outcome uniformly with the Fast Dice
//!   Roller, then keep it with probability `m_j / max(m)`.
//! - [`RejectionHashTable`]: draw a `k`-bit integer `W`; if `W < Z`, the
//!   outcome is a direct table lookup.
//! - [`RejectionBinarySearch`]: same proposal, but the outcome is found by
//!   binary search over the cumulative masses.
//!
//! The tree-shaped rejection samplers (a DDG tree with an extra reject leaf)
//! are the `sample_with_retry` walks in [`crate::ddg`].
//!
//! Outcomes are 1-indexed.

use crate::bernoulli::BernoulliRatio;
use crate::fdr::FastDiceRoller;
use crate::flip::BitStream;
use crate::search::search;

/// Uniform proposal with a per-outcome Bernoulli acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionUniform {
    dice: FastDiceRoller,
    ratios: Vec<BernoulliRatio>,
}

impl RejectionUniform {
    /// `ratios[j]` is the acceptance probability of outcome `j + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `ratios` is empty.
    pub fn new(ratios: Vec<BernoulliRatio>) -> Self {
        Self {
            dice: FastDiceRoller::new(ratios.len()),
            ratios,
        }
    }

    pub fn ratios(&self) -> &[BernoulliRatio] {
        &self.ratios
    }

    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        loop {
            let j = self.dice.sample(bits);
            if self.ratios[j - 1].sample(bits) {
                return j;
            }
        }
    }
}

/// `k`-bit proposal resolved by direct lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionHashTable {
    k: u32,
    z: u64,
    table: Vec<usize>,
}

impl RejectionHashTable {
    /// `table[w]` is the 1-indexed outcome owning proposal value `w`;
    /// `table.len()` is the target mass `Z <= 2^k`.
    pub fn new(table: Vec<usize>, k: u32) -> Self {
        let z = table.len() as u64;
        debug_assert!(k >= 64 || z <= 1u64 << k);
        Self { k, z, table }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn total(&self) -> u64 {
        self.z
    }

    pub fn table(&self) -> &[usize] {
        &self.table
    }

    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        loop {
            let w = bits.next_uniform(self.k);
            if w < self.z {
                return self.table[w as usize];
            }
        }
    }
}

/// `k`-bit proposal resolved by searching the cumulative masses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionBinarySearch {
    k: u32,
    z: u64,
    cdf: Vec<u64>,
}

impl RejectionBinarySearch {
    /// `cdf` is `[0, c_1, ..., Z]`, `Z <= 2^k`.
    pub fn new(cdf: Vec<u64>, k: u32) -> Self {
        let z = cdf.last().copied().unwrap_or(0);
        debug_assert!(cdf.first() == Some(&0));
        Self { k, z, cdf }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn total(&self) -> u64 {
        self.z
    }

    pub fn cdf(&self) -> &[u64] {
        &self.cdf
    }

    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        loop {
            let w = bits.next_uniform(self.k);
            if w < self.z {
                if let Some(j) = search(&self.cdf, w) {
                    return j + 1;
                }
            }
        }
    }
}

//! Choosing a sampler by name.
//!
//! [`SamplerKind`] names every algorithm in the crate; [`SamplerConfig`]
//! turns a kind and a weight vector into a [`Sampler`], which dispatches
//! draws to the concrete representation.
//!
//! ```
//! use ddgsample::{BitSource, SamplerConfig, SamplerKind, Weights};
//!
//! let weights = Weights::new(&[3, 2, 1, 7, 2, 1]).unwrap();
//! let kind: SamplerKind = "ky.enc".parse().unwrap();
//! let mut sampler = SamplerConfig::new(kind).build(&weights).unwrap();
//!
//! let mut bits = BitSource::seed_from_u64(7);
//! let x = sampler.sample(&mut bits);
//! assert!((1..=6).contains(&x));
//! ```

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::alias::{AliasTable, ReferenceAlias};
use crate::bernoulli::BernoulliRatio;
use crate::construct::{self, Weights};
use crate::ddg::{DdgEncoding, DdgMatrix, DdgMatrixCached};
use crate::error::SamplerError;
use crate::fdr::FastDiceRoller;
use crate::flip::BitStream;
use crate::interval::IntervalTable;
use crate::rejection::{RejectionBinarySearch, RejectionHashTable, RejectionUniform};

/// Every sampling algorithm, by its selector name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    /// `ky.enc`: Knuth–Yao over a packed tree.
    KyEncoding,
    /// `ky.mat`: Knuth–Yao over the digit matrix.
    KyMatrix,
    /// `ky.matc`: Knuth–Yao over the cached digit matrix.
    KyMatrixCached,
    /// `fdr`: Fast Dice Roller (uniform weights only).
    Fdr,
    /// `inv.bern`: Bernoulli inversion (two outcomes only).
    Bernoulli,
    /// `rej.uniform`
    RejectionUniform,
    /// `rej.table`
    RejectionHashTable,
    /// `rej.binary`
    RejectionBinarySearch,
    /// `rej.enc`
    RejectionEncoding,
    /// `rej.mat`
    RejectionMatrix,
    /// `rej.matc`
    RejectionMatrixCached,
    /// `interval`
    Interval,
    /// `alias.exact`
    AliasExact,
    /// `alias.ref`: `rand_distr` baseline; does not read the bit stream.
    AliasReference,
}

impl SamplerKind {
    pub const ALL: [SamplerKind; 14] = [
        SamplerKind::KyEncoding,
        SamplerKind::KyMatrix,
        SamplerKind::KyMatrixCached,
        SamplerKind::Fdr,
        SamplerKind::Bernoulli,
        SamplerKind::RejectionUniform,
        SamplerKind::RejectionHashTable,
        SamplerKind::RejectionBinarySearch,
        SamplerKind::RejectionEncoding,
        SamplerKind::RejectionMatrix,
        SamplerKind::RejectionMatrixCached,
        SamplerKind::Interval,
        SamplerKind::AliasExact,
        SamplerKind::AliasReference,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SamplerKind::KyEncoding => "ky.enc",
            SamplerKind::KyMatrix => "ky.mat",
            SamplerKind::KyMatrixCached => "ky.matc",
            SamplerKind::Fdr => "fdr",
            SamplerKind::Bernoulli => "inv.bern",
            SamplerKind::RejectionUniform => "rej.uniform",
            SamplerKind::RejectionHashTable => "rej.table",
            SamplerKind::RejectionBinarySearch => "rej.binary",
            SamplerKind::RejectionEncoding => "rej.enc",
            SamplerKind::RejectionMatrix => "rej.mat",
            SamplerKind::RejectionMatrixCached => "rej.matc",
            SamplerKind::Interval => "interval",
            SamplerKind::AliasExact => "alias.exact",
            SamplerKind::AliasReference => "alias.ref",
        }
    }

    /// Whether the kind accepts any weight vector (`fdr` and `inv.bern`
    /// do not).
    pub fn is_general(self) -> bool {
        !matches!(self, SamplerKind::Fdr | SamplerKind::Bernoulli)
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SamplerKind {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SamplerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SamplerError::UnknownSampler(s.to_string()))
    }
}

/// Builder for a [`Sampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    kind: SamplerKind,
    seed: Option<u64>,
}

impl SamplerConfig {
    pub fn new(kind: SamplerKind) -> Self {
        Self { kind, seed: None }
    }

    /// Seed for samplers that own a generator (`alias.ref`). Without one,
    /// they are seeded from the OS.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    /// Build the representation for `weights`.
    pub fn build(&self, weights: &Weights) -> Result<Sampler, SamplerError> {
        let sampler = match self.kind {
            SamplerKind::KyEncoding => Sampler::KyEncoding(construct::ky_encoding(weights)?),
            SamplerKind::KyMatrix => Sampler::KyMatrix(construct::ky_matrix(weights)?),
            SamplerKind::KyMatrixCached => {
                Sampler::KyMatrixCached(construct::ky_matrix_cached(weights)?)
            }
            SamplerKind::Fdr => {
                if !weights.is_uniform() {
                    return Err(SamplerError::NotUniform);
                }
                Sampler::Fdr(FastDiceRoller::new(weights.len()))
            }
            SamplerKind::Bernoulli => {
                if weights.len() != 2 {
                    return Err(SamplerError::NotBinary(weights.len()));
                }
                let a = weights.numerators()[1];
                Sampler::Bernoulli(BernoulliRatio::new(a, weights.total()))
            }
            SamplerKind::RejectionUniform => {
                Sampler::RejectionUniform(construct::rejection_uniform(weights))
            }
            SamplerKind::RejectionHashTable => {
                Sampler::RejectionHashTable(construct::rejection_hash_table(weights)?)
            }
            SamplerKind::RejectionBinarySearch => {
                Sampler::RejectionBinarySearch(construct::rejection_binary_search(weights))
            }
            SamplerKind::RejectionEncoding => {
                Sampler::RejectionEncoding(construct::rejection_encoding(weights))
            }
            SamplerKind::RejectionMatrix => {
                Sampler::RejectionMatrix(construct::rejection_matrix(weights))
            }
            SamplerKind::RejectionMatrixCached => {
                Sampler::RejectionMatrixCached(construct::rejection_matrix_cached(weights))
            }
            SamplerKind::Interval => Sampler::Interval(construct::interval_table(weights)),
            SamplerKind::AliasExact => Sampler::AliasExact(construct::alias_table(weights)?),
            SamplerKind::AliasReference => {
                let rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                Sampler::AliasReference(ReferenceAlias::new(weights.numerators(), rng)?)
            }
        };
        debug!(kind = %self.kind, outcomes = weights.len(), seeded = self.seed.is_some(), "configured sampler");
        Ok(sampler)
    }
}

/// A configured sampler. Every variant returns 1-indexed outcomes.
#[derive(Debug, Clone)]
pub enum Sampler {
    KyEncoding(DdgEncoding),
    KyMatrix(DdgMatrix),
    KyMatrixCached(DdgMatrixCached),
    Fdr(FastDiceRoller),
    /// Outcome 1 is `false`, outcome 2 is `true`.
    Bernoulli(BernoulliRatio),
    RejectionUniform(RejectionUniform),
    RejectionHashTable(RejectionHashTable),
    RejectionBinarySearch(RejectionBinarySearch),
    RejectionEncoding(DdgEncoding),
    RejectionMatrix(DdgMatrix),
    RejectionMatrixCached(DdgMatrixCached),
    Interval(IntervalTable),
    AliasExact(AliasTable),
    AliasReference(ReferenceAlias),
}

impl Sampler {
    pub fn kind(&self) -> SamplerKind {
        match self {
            Sampler::KyEncoding(_) => SamplerKind::KyEncoding,
            Sampler::KyMatrix(_) => SamplerKind::KyMatrix,
            Sampler::KyMatrixCached(_) => SamplerKind::KyMatrixCached,
            Sampler::Fdr(_) => SamplerKind::Fdr,
            Sampler::Bernoulli(_) => SamplerKind::Bernoulli,
            Sampler::RejectionUniform(_) => SamplerKind::RejectionUniform,
            Sampler::RejectionHashTable(_) => SamplerKind::RejectionHashTable,
            Sampler::RejectionBinarySearch(_) => SamplerKind::RejectionBinarySearch,
            Sampler::RejectionEncoding(_) => SamplerKind::RejectionEncoding,
            Sampler::RejectionMatrix(_) => SamplerKind::RejectionMatrix,
            Sampler::RejectionMatrixCached(_) => SamplerKind::RejectionMatrixCached,
            Sampler::Interval(_) => SamplerKind::Interval,
            Sampler::AliasExact(_) => SamplerKind::AliasExact,
            Sampler::AliasReference(_) => SamplerKind::AliasReference,
        }
    }

    /// Draw one outcome.
    ///
    /// `&mut self` because the reference alias advances its own generator;
    /// every other variant only reads its table.
    pub fn sample<B: BitStream + ?Sized>(&mut self, bits: &mut B) -> usize {
        match self {
            Sampler::KyEncoding(s) => s.sample(bits),
            Sampler::KyMatrix(s) => s.sample(bits),
            Sampler::KyMatrixCached(s) => s.sample(bits),
            Sampler::Fdr(s) => s.sample(bits),
            Sampler::Bernoulli(s) => 1 + usize::from(s.sample(bits)),
            Sampler::RejectionUniform(s) => s.sample(bits),
            Sampler::RejectionHashTable(s) => s.sample(bits),
            Sampler::RejectionBinarySearch(s) => s.sample(bits),
            Sampler::RejectionEncoding(s) => s.sample_with_retry(bits),
            Sampler::RejectionMatrix(s) => s.sample_with_retry(bits),
            Sampler::RejectionMatrixCached(s) => s.sample_with_retry(bits),
            Sampler::Interval(s) => s.sample(bits),
            Sampler::AliasExact(s) => s.sample(bits),
            Sampler::AliasReference(s) => s.draw(),
        }
    }
}

//! `ddgsample`: exact sampling from discrete distributions using fair bits.
//!
//! Every sampler here consumes a stream of unbiased random bits and returns
//! an outcome with exactly its rational target probability; there is no
//! floating point on the sampling path. The interesting metric is how many
//! bits a draw costs, which [`BitSource`] counts.
//!
//! Exposed modules:
//! - `flip`: the [`BitStream`] seam, a buffered [`BitSource`] over any
//!   `rand` generator, and [`ReplayBits`] for fixed sequences.
//! - `ddg`: Knuth–Yao walks over DDG trees (matrix, cached matrix, packed
//!   encoding), with and without a reject leaf.
//! - `fdr`, `bernoulli`: Fast Dice Roller and Bernoulli inversion.
//! - `rejection`, `interval`, `alias`: the remaining exact samplers, plus a
//!   `rand_distr` alias baseline.
//! - `search`, `expansion`: cumulative-table search and binary-expansion
//!   arithmetic.
//! - `construct`: building every representation from integer [`Weights`].
//! - `sampler`: [`SamplerKind`] names and the [`Sampler`] enum.
//!
//! Samplers take the bit stream explicitly, so each thread owns its own
//! [`BitSource`] and draws are reproducible from a seed.

#![forbid(unsafe_code)]

pub mod alias;
pub mod bernoulli;
pub mod construct;
pub mod ddg;
pub mod error;
pub mod expansion;
pub mod fdr;
pub mod flip;
pub mod interval;
pub mod rejection;
pub mod sampler;
pub mod search;

pub use alias::{AliasTable, ReferenceAlias};
pub use bernoulli::BernoulliRatio;
pub use construct::Weights;
pub use ddg::{DdgEncoding, DdgMatrix, DdgMatrixCached};
pub use error::SamplerError;
pub use fdr::FastDiceRoller;
pub use flip::{BitSource, BitStream, ReplayBits};
pub use interval::IntervalTable;
pub use rejection::{RejectionBinarySearch, RejectionHashTable, RejectionUniform};
pub use sampler::{Sampler, SamplerConfig, SamplerKind};
pub use search::{search, search_nested};

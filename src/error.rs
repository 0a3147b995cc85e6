//! Error types.
//!
//! Sampling itself never fails: representations are preconditions, and a
//! malformed table loops or indexes out of range rather than reporting.
//! Errors only come from turning names and weight vectors into samplers.

use thiserror::Error;

/// Errors raised while configuring or constructing a sampler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplerError {
    /// The algorithm selector did not name a known sampler.
    #[error("unknown sampler: {0}")]
    UnknownSampler(String),

    /// No weights were supplied.
    #[error("weight vector is empty")]
    EmptyWeights,

    /// All weights were zero.
    #[error("weights sum to zero")]
    ZeroTotal,

    /// The normalizing total does not fit the exact integer arithmetic.
    #[error("total weight {total} exceeds 2^62")]
    TotalTooLarge { total: u128 },

    /// A table would overflow `u64` or exceed a size limit.
    #[error("cannot build table: {0}")]
    Overflow(&'static str),

    /// Numerators for an explicit `(k, l)` expansion do not sum to `Zkl`.
    #[error("numerators sum to {sum}, expected {expected}")]
    InvalidNumerators { sum: u128, expected: u128 },

    /// A literal bit string contained something other than `0` or `1`.
    #[error("invalid bit {found:?} at position {index}")]
    InvalidBit { index: usize, found: char },

    /// The fast dice roller needs equal weights.
    #[error("fdr requires uniform weights")]
    NotUniform,

    /// Bernoulli inversion needs exactly two outcomes.
    #[error("inv.bern requires exactly two outcomes (got {0})")]
    NotBinary(usize),

    /// The reference alias collaborator rejected its input.
    #[error("reference alias: {0}")]
    Reference(String),
}

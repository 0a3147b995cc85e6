//! Building sampler representations from exact integer weights.
//!
//! Every sampler in this crate walks a precomputed table: a DDG matrix or
//! encoding, a cumulative array, an alias table. This module turns a weight
//! vector into those tables. All arithmetic is integer; floating point only
//! appears in [`Weights::probability`] and [`Weights::entropy`], which are
//! for reporting.
//!
//! Samplers never validate their tables. These builders are where bad input
//! is caught, and they return [`SamplerError`] for it.

use tracing::debug;

use crate::alias::AliasTable;
use crate::bernoulli::BernoulliRatio;
use crate::ddg::{DdgEncoding, DdgMatrix, DdgMatrixCached};
use crate::error::SamplerError;
use crate::expansion::{
    binary_digits, bounded_expansion_length, ceil_log2, reduce_fractions, zkl,
};
use crate::interval::IntervalTable;
use crate::rejection::{RejectionBinarySearch, RejectionHashTable, RejectionUniform};

/// Largest total weight accepted, exclusive.
pub const MAX_TOTAL: u64 = 1 << 62;

/// Longest binary expansion a Knuth–Yao tree may use.
pub const MAX_DEPTH: u32 = 1 << 16;

/// Longest lookup table [`rejection_hash_table`] will allocate.
pub const MAX_TABLE_LEN: u64 = 1 << 26;

/// A discrete distribution as integer weights in lowest terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Weights {
    numerators: Vec<u64>,
    total: u64,
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Weights {
    /// Normalize `weights` by their greatest common divisor.
    ///
    /// Zero weights are allowed; those outcomes are never drawn.
    pub fn new(weights: &[u64]) -> Result<Self, SamplerError> {
        if weights.is_empty() {
            return Err(SamplerError::EmptyWeights);
        }
        let sum: u128 = weights.iter().map(|&w| u128::from(w)).sum();
        if sum == 0 {
            return Err(SamplerError::ZeroTotal);
        }
        let g = weights.iter().fold(0u64, |g, &w| gcd(g, w));
        let total = sum / u128::from(g);
        if total >= u128::from(MAX_TOTAL) {
            return Err(SamplerError::TotalTooLarge { total });
        }
        Ok(Self {
            numerators: weights.iter().map(|&w| w / g).collect(),
            total: total as u64,
        })
    }

    pub fn numerators(&self) -> &[u64] {
        &self.numerators
    }

    /// Common denominator `Z`.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.numerators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numerators.is_empty()
    }

    /// Probability of outcome `i` (0-indexed), as a float.
    pub fn probability(&self, i: usize) -> f64 {
        self.numerators[i] as f64 / self.total as f64
    }

    /// Shannon entropy in bits.
    pub fn entropy(&self) -> f64 {
        (0..self.len())
            .map(|i| self.probability(i))
            .filter(|&p| p > 0.0)
            .map(|p| -p * p.log2())
            .sum()
    }

    /// Bits per proposal for the rejection samplers: `ceil(log2 Z)`.
    pub fn rejection_precision(&self) -> u32 {
        ceil_log2(self.total)
    }

    /// Whether every outcome carries the same weight.
    pub fn is_uniform(&self) -> bool {
        self.numerators.windows(2).all(|w| w[0] == w[1])
    }

    /// `[0, m_1, m_1 + m_2, ..., Z]`.
    pub fn cdf(&self) -> Vec<u64> {
        std::iter::once(0)
            .chain(self.numerators.iter().scan(0u64, |acc, &m| {
                *acc += m;
                Some(*acc)
            }))
            .collect()
    }
}

fn digit_rows(ms: &[u64], z: u64, k: u32) -> Vec<Vec<bool>> {
    ms.iter().map(|&m| binary_digits(m, z, k)).collect()
}

/// Knuth–Yao digit matrix for `weights`.
///
/// Fails with [`SamplerError::Overflow`] when the expansion of `1/Z` is
/// longer than [`MAX_DEPTH`] digits.
pub fn ky_matrix(weights: &Weights) -> Result<DdgMatrix, SamplerError> {
    let z = weights.total();
    let (k, l) = bounded_expansion_length(z, MAX_DEPTH)
        .ok_or(SamplerError::Overflow("binary expansion exceeds maximum depth"))?;
    let rows = digit_rows(weights.numerators(), z, k);
    debug!(outcomes = weights.len(), total = z, k, l, "built Knuth-Yao matrix");
    Ok(DdgMatrix::new(rows, k as usize, l as usize))
}

/// Digit matrix for numerators over `Zkl = 2^k - 2^l`.
///
/// The system is reduced to its shortest form first.
pub fn ddg_matrix(ms: &[u64], k: u32, l: u32) -> Result<DdgMatrix, SamplerError> {
    if ms.is_empty() {
        return Err(SamplerError::EmptyWeights);
    }
    if l > k {
        return Err(SamplerError::Overflow("preperiod longer than expansion"));
    }
    let expected = zkl(k, l).ok_or(SamplerError::Overflow("2^k exceeds u64"))?;
    let sum: u128 = ms.iter().map(|&m| u128::from(m)).sum();
    if sum != u128::from(expected) {
        return Err(SamplerError::InvalidNumerators {
            sum,
            expected: u128::from(expected),
        });
    }
    let (ms, k, l) = reduce_fractions(ms, k, l);
    let z = zkl(k, l).ok_or(SamplerError::Overflow("2^k exceeds u64"))?;
    debug!(outcomes = ms.len(), k, l, "built DDG matrix");
    Ok(DdgMatrix::new(digit_rows(&ms, z, k), k as usize, l as usize))
}

pub fn ky_matrix_cached(weights: &Weights) -> Result<DdgMatrixCached, SamplerError> {
    Ok(DdgMatrixCached::from_matrix(&ky_matrix(weights)?))
}

pub fn ky_encoding(weights: &Weights) -> Result<DdgEncoding, SamplerError> {
    Ok(DdgEncoding::from_matrix(&ky_matrix(weights)?))
}

/// FDR proposal, accepting outcome `i` with probability `m_i / max m`.
pub fn rejection_uniform(weights: &Weights) -> RejectionUniform {
    let max = weights.numerators().iter().copied().max().unwrap_or(1);
    let ratios = weights
        .numerators()
        .iter()
        .map(|&m| BernoulliRatio::new(m, max))
        .collect();
    debug!(outcomes = weights.len(), max, "built uniform rejection sampler");
    RejectionUniform::new(ratios)
}

/// Lookup table of length `Z` under a `ceil(log2 Z)`-bit proposal.
pub fn rejection_hash_table(weights: &Weights) -> Result<RejectionHashTable, SamplerError> {
    let z = weights.total();
    if z > MAX_TABLE_LEN {
        return Err(SamplerError::Overflow("lookup table too large"));
    }
    let table: Vec<usize> = weights
        .numerators()
        .iter()
        .enumerate()
        .flat_map(|(i, &m)| std::iter::repeat(i + 1).take(m as usize))
        .collect();
    let k = weights.rejection_precision();
    debug!(outcomes = weights.len(), total = z, k, "built rejection lookup table");
    Ok(RejectionHashTable::new(table, k))
}

pub fn rejection_binary_search(weights: &Weights) -> RejectionBinarySearch {
    let k = weights.rejection_precision();
    debug!(outcomes = weights.len(), total = weights.total(), k, "built rejection cdf");
    RejectionBinarySearch::new(weights.cdf(), k)
}

/// Dyadic DDG matrix over `2^p`, `p = ceil(log2 Z)`, whose last row holds
/// the reject mass `2^p - Z`.
pub fn rejection_matrix(weights: &Weights) -> DdgMatrix {
    let z = weights.total();
    let p = weights.rejection_precision();
    if p == 0 {
        // Z == 1: one outcome holds everything, as the expansion 0.111...
        let mut rows: Vec<Vec<bool>> =
            weights.numerators().iter().map(|&m| vec![m == 1]).collect();
        rows.push(vec![false]);
        debug!(outcomes = weights.len(), k = 1, l = 0, "built rejection matrix");
        return DdgMatrix::new(rows, 1, 0);
    }
    let scale = 1u64 << p;
    let reject = scale - z;
    let mut rows = digit_rows(weights.numerators(), scale, p);
    rows.push(binary_digits(reject, scale, p));
    debug!(outcomes = weights.len(), k = p, reject, "built rejection matrix");
    DdgMatrix::new(rows, p as usize, p as usize)
}

pub fn rejection_matrix_cached(weights: &Weights) -> DdgMatrixCached {
    DdgMatrixCached::from_matrix(&rejection_matrix(weights))
}

pub fn rejection_encoding(weights: &Weights) -> DdgEncoding {
    DdgEncoding::from_matrix(&rejection_matrix(weights))
}

pub fn interval_table(weights: &Weights) -> IntervalTable {
    debug!(outcomes = weights.len(), total = weights.total(), "built interval table");
    IntervalTable::new(weights.cdf(), weights.total())
}

/// Exact alias table.
///
/// Each of the `n` buckets holds mass `Z` out of `n * Z`; outcome `i` needs
/// `n * m_i`. Buckets below `Z` are topped up from buckets above it.
pub fn alias_table(weights: &Weights) -> Result<AliasTable, SamplerError> {
    let n = weights.len();
    let z = weights.total();
    let mut q: Vec<u64> = weights
        .numerators()
        .iter()
        .map(|&m| m.checked_mul(n as u64))
        .collect::<Option<_>>()
        .ok_or(SamplerError::Overflow("alias masses exceed u64"))?;

    let mut keep = vec![z; n];
    let mut aliases: Vec<usize> = (0..n).collect();
    let (mut small, mut large): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| q[i] < z);
    while let (Some(s), Some(g)) = (small.pop(), large.last().copied()) {
        keep[s] = q[s];
        aliases[s] = g;
        q[g] -= z - q[s];
        if q[g] < z {
            large.pop();
            small.push(g);
        }
    }
    // Leftover buckets are exactly full.
    for i in small.into_iter().chain(large) {
        keep[i] = z;
    }

    let ratios = keep.into_iter().map(|a| BernoulliRatio::new(a, z)).collect();
    debug!(outcomes = n, total = z, "built alias table");
    Ok(AliasTable::new(ratios, aliases))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_reduce_to_lowest_terms() {
        let w = Weights::new(&[4, 6, 0, 2]).expect("weights");
        assert_eq!(w.numerators(), &[2, 3, 0, 1]);
        assert_eq!(w.total(), 6);
        assert_eq!(w.cdf(), vec![0, 2, 5, 5, 6]);
        assert!(!w.is_uniform());
        assert!(Weights::new(&[7, 7, 7]).expect("weights").is_uniform());
    }

    #[test]
    fn weights_errors() {
        assert_eq!(Weights::new(&[]), Err(SamplerError::EmptyWeights));
        assert_eq!(Weights::new(&[0, 0]), Err(SamplerError::ZeroTotal));
        assert_eq!(
            Weights::new(&[1 << 62, 1]),
            Err(SamplerError::TotalTooLarge {
                total: (1 << 62) + 1
            })
        );
        // Large but divisible is fine.
        let w = Weights::new(&[1 << 62, 1 << 62]).expect("weights");
        assert_eq!(w.total(), 2);
    }

    #[test]
    fn rejection_precision_is_ceil_log2() {
        assert_eq!(Weights::new(&[6, 13, 2]).expect("weights").rejection_precision(), 5);
        assert_eq!(Weights::new(&[1, 1, 1, 1]).expect("weights").rejection_precision(), 2);
        assert_eq!(Weights::new(&[5]).expect("weights").rejection_precision(), 0);
    }

    #[test]
    fn entropy_of_simple_distributions() {
        let fair = Weights::new(&[1, 1]).expect("weights");
        assert!((fair.entropy() - 1.0).abs() < 1e-12);
        let point = Weights::new(&[0, 3]).expect("weights");
        assert_eq!(point.entropy(), 0.0);
    }

    #[test]
    fn ky_matrix_digits() {
        // Z = 3: (k, l) = (2, 0); 1/3 = 0.(01), 2/3 = 0.(10).
        let m = ky_matrix(&Weights::new(&[1, 2]).expect("weights")).expect("matrix");
        assert_eq!((m.k(), m.l()), (2, 0));
        assert_eq!(m.rows(), &[vec![false, true], vec![true, false]]);

        // Z = 6: (k, l) = (3, 1).
        let m = ky_matrix(&Weights::new(&[1, 5]).expect("weights")).expect("matrix");
        assert_eq!((m.k(), m.l()), (3, 1));
    }

    #[test]
    fn ky_matrix_point_mass() {
        let m = ky_matrix(&Weights::new(&[0, 9, 0]).expect("weights")).expect("matrix");
        assert_eq!((m.k(), m.l()), (1, 0));
        assert_eq!(m.rows(), &[vec![false], vec![true], vec![false]]);
    }

    #[test]
    fn ky_matrix_refuses_long_period() {
        // 1/999983 repeats with a period far beyond the depth limit.
        let w = Weights::new(&[1, 999_982]).expect("weights");
        assert!(matches!(ky_matrix(&w), Err(SamplerError::Overflow(_))));
    }

    #[test]
    fn ddg_matrix_validates_sum() {
        assert_eq!(
            ddg_matrix(&[1, 2], 2, 2),
            Err(SamplerError::InvalidNumerators { sum: 3, expected: 4 })
        );
        assert!(ddg_matrix(&[1, 2], 2, 0).is_ok());
        assert_eq!(ddg_matrix(&[], 2, 0), Err(SamplerError::EmptyWeights));
    }

    #[test]
    fn rejection_matrix_rows() {
        // Z = 21, p = 5, reject mass 11.
        let m = rejection_matrix(&Weights::new(&[6, 13, 2]).expect("weights"));
        assert_eq!((m.k(), m.l()), (5, 5));
        assert_eq!(m.outcomes(), 4);
        let as_int = |row: &[bool]| row.iter().fold(0u64, |n, &b| (n << 1) | u64::from(b));
        let masses: Vec<u64> = m.rows().iter().map(|r| as_int(r)).collect();
        assert_eq!(masses, vec![6, 13, 2, 11]);
    }

    #[test]
    fn rejection_matrix_point_mass() {
        let m = rejection_matrix(&Weights::new(&[0, 4]).expect("weights"));
        assert_eq!((m.k(), m.l()), (1, 0));
        assert_eq!(m.rows(), &[vec![false], vec![true], vec![false]]);
    }

    #[test]
    fn hash_table_layout() {
        let t = rejection_hash_table(&Weights::new(&[2, 0, 1]).expect("weights")).expect("table");
        assert_eq!(t.table(), &[1, 1, 3]);
        assert_eq!(t.k(), 2);
    }

    #[test]
    fn hash_table_too_large() {
        let w = Weights::new(&[1, MAX_TABLE_LEN]).expect("weights");
        assert!(matches!(rejection_hash_table(&w), Err(SamplerError::Overflow(_))));
    }

    #[test]
    fn alias_table_uniform_needs_no_aliases() {
        let t = alias_table(&Weights::new(&[1, 1, 1, 1]).expect("weights")).expect("alias");
        assert!(t.ratios().iter().all(|r| r.numerator() == r.denominator()));
    }
}

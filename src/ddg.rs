//! Knuth–Yao sampling over discrete-distribution-generating (DDG) trees.
//!
//! A DDG tree is a binary tree whose leaves are labelled with outcomes; a
//! root-to-leaf walk driven by fair bits reaches outcome `i` with exactly its
//! target probability. Knuth and Yao showed the walk built from the binary
//! expansions of the probabilities is entropy-optimal: expected cost is below
//! `H(p) + 2` bits.
//!
//! Three representations of the same tree are provided:
//!
//! - [`DdgMatrix`]: row `i` holds the binary digits of `p_i`; column `c` is
//!   tree level `c + 1`. Each level scans every row.
//! - [`DdgMatrixCached`]: per-level leaf counts `h` and the outcome of each
//!   leaf, so a level is one comparison.
//! - [`DdgEncoding`]: the tree packed into a successor array.
//!
//! For non-dyadic probabilities the expansions repeat, so the tree has a
//! back edge: after the last column `k - 1`, the walk continues at column `l`.
//!
//! Each representation also has a `sample_with_retry` walk, used for
//! rejection sampling: the last outcome is a reject label, and landing on it
//! restarts the walk from the root.
//!
//! Outcomes are 1-indexed.
//!
//! ## References
//!
//! - Knuth & Yao (1976): *The complexity of nonuniform random number
//!   generation*.
//! - Saad, Freer, Rinard, Mansinghka (2020): *Optimal approximate sampling
//!   from discrete probability distributions*.

use tracing::debug;

use crate::flip::BitStream;

/// DDG tree as a binary matrix of probability digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdgMatrix {
    k: usize,
    l: usize,
    rows: Vec<Vec<bool>>,
}

impl DdgMatrix {
    /// `rows[i][c]` is digit `c` of outcome `i`'s probability; every row
    /// has `k` digits and the repeating block starts at column `l`.
    pub fn new(rows: Vec<Vec<bool>>, k: usize, l: usize) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == k));
        debug_assert!(l <= k);
        Self { k, l, rows }
    }

    /// Number of digit columns.
    pub fn k(&self) -> usize {
        self.k
    }

    /// First column of the repeating block (`k` when dyadic).
    pub fn l(&self) -> usize {
        self.l
    }

    /// Number of rows, including a reject row if present.
    pub fn outcomes(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    #[inline]
    fn next_column(&self, c: usize) -> usize {
        if c == self.k - 1 {
            self.l
        } else {
            c + 1
        }
    }

    /// Walk the tree, returning an outcome in `1..=outcomes()`.
    ///
    /// `d` counts the internal nodes to the right of the current one at
    /// the current level; the walk stops on the row that brings it to `-1`.
    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        if self.rows.len() == 1 {
            return 1;
        }
        let mut c = 0usize;
        let mut d = 0i64;
        loop {
            d = 2 * d + i64::from(!bits.next_bit());
            for (r, row) in self.rows.iter().enumerate() {
                d -= i64::from(row[c]);
                if d == -1 {
                    return r + 1;
                }
            }
            c = self.next_column(c);
        }
    }

    /// Walk the tree, restarting whenever the last row (the reject
    /// outcome) is reached. Returns an outcome in `1..outcomes()`.
    pub fn sample_with_retry<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        let n = self.rows.len();
        loop {
            let s = self.sample(bits);
            if s < n {
                return s;
            }
        }
    }
}

/// DDG matrix with per-level leaf counts cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdgMatrixCached {
    k: usize,
    l: usize,
    h: Vec<usize>,
    table: Vec<Vec<usize>>,
}

impl DdgMatrixCached {
    /// `h[c]` is the number of leaves at column `c`; `table[d][c]` is the
    /// 0-indexed outcome of the `d`-th of them (`d < h[c]`). `table` has one
    /// row per outcome.
    pub fn new(h: Vec<usize>, table: Vec<Vec<usize>>, k: usize, l: usize) -> Self {
        debug_assert_eq!(h.len(), k);
        debug_assert!(table.iter().all(|r| r.len() == k));
        Self { k, l, h, table }
    }

    /// Derive leaf counts and leaf outcomes from a digit matrix.
    pub fn from_matrix(matrix: &DdgMatrix) -> Self {
        let k = matrix.k();
        let mut h = vec![0usize; k];
        let mut table = vec![vec![0usize; k]; matrix.outcomes()];
        for (r, row) in matrix.rows().iter().enumerate() {
            for (c, &bit) in row.iter().enumerate() {
                if bit {
                    table[h[c]][c] = r;
                    h[c] += 1;
                }
            }
        }
        debug!(outcomes = matrix.outcomes(), k, l = matrix.l(), "cached DDG leaf table");
        Self::new(h, table, k, matrix.l())
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn l(&self) -> usize {
        self.l
    }

    /// Leaf count per column.
    pub fn h(&self) -> &[usize] {
        &self.h
    }

    /// Leaf outcomes, indexed `[d][c]`.
    pub fn table(&self) -> &[Vec<usize>] {
        &self.table
    }

    pub fn outcomes(&self) -> usize {
        self.table.len()
    }

    #[inline]
    fn next_column(&self, c: usize) -> usize {
        if c == self.k - 1 {
            self.l
        } else {
            c + 1
        }
    }

    /// Walk the tree, returning an outcome in `1..=outcomes()`.
    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        if self.table.len() == 1 {
            return 1;
        }
        let mut c = 0usize;
        let mut d = 0usize;
        loop {
            d = 2 * d + usize::from(!bits.next_bit());
            if d < self.h[c] {
                return self.table[d][c] + 1;
            }
            d -= self.h[c];
            c = self.next_column(c);
        }
    }

    /// Walk with restarts on the last (reject) outcome.
    pub fn sample_with_retry<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        let reject = self.table.len() - 1;
        let mut c = 0usize;
        let mut d = 0usize;
        loop {
            d = 2 * d + usize::from(!bits.next_bit());
            if d < self.h[c] {
                let s = self.table[d][c];
                if s < reject {
                    return s + 1;
                }
                d = 0;
                c = 0;
            } else {
                d -= self.h[c];
                c = self.next_column(c);
            }
        }
    }
}

/// DDG tree packed into a successor array.
///
/// An internal node at offset `c` stores its two children at `c` (bit 0)
/// and `c + 1` (bit 1). A leaf is a single negative slot `-outcome`. The
/// root sits at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdgEncoding {
    n: usize,
    k: usize,
    encoding: Vec<i64>,
}

impl DdgEncoding {
    /// `n` counts outcome labels (including a reject label if present);
    /// `k` is the depth of the tree before any back edge.
    pub fn new(encoding: Vec<i64>, n: usize, k: usize) -> Self {
        debug_assert!(!encoding.is_empty());
        Self { n, k, encoding }
    }

    /// Pack the tree described by `matrix`.
    ///
    /// Nodes are laid out level by level; internal nodes created at the last
    /// column are the nodes that feed column `l`, which closes the back edge.
    /// The resulting walk consumes exactly the bits the matrix walk would.
    ///
    /// # Panics
    ///
    /// Panics if `matrix` does not describe a DDG tree (more leaves than
    /// nodes at some level, or a back edge whose widths disagree).
    pub fn from_matrix(matrix: &DdgMatrix) -> Self {
        let n = matrix.outcomes();
        let k = matrix.k();
        let l = matrix.l();
        if n == 1 {
            return Self::new(vec![-1], 1, k);
        }
        let cached = DdgMatrixCached::from_matrix(matrix);
        let h = cached.h();
        let table = cached.table();

        // internal[c]: offsets of the internal nodes whose children sit in column c.
        let mut internal: Vec<Vec<usize>> = Vec::with_capacity(k + 1);
        internal.push(vec![0]);
        let mut leaves: Vec<Vec<usize>> = Vec::with_capacity(k);
        let mut next = 2usize;
        for c in 0..k {
            let children = 2 * internal[c].len();
            assert!(
                h[c] <= children,
                "DdgEncoding: column {c} has {} leaves but only {children} slots",
                h[c]
            );
            leaves.push((next..next + h[c]).collect());
            next += h[c];

            let count = children - h[c];
            if c + 1 == k && l < k {
                assert_eq!(
                    count,
                    internal[l].len(),
                    "DdgEncoding: column {c} does not wrap onto column {l}"
                );
                let wrapped = internal[l].clone();
                internal.push(wrapped);
            } else {
                internal.push((0..count).map(|i| next + 2 * i).collect());
                next += 2 * count;
            }
        }

        let mut encoding = vec![0i64; next];
        for c in 0..k {
            for (x, &offset) in leaves[c].iter().enumerate() {
                encoding[offset] = -(table[x][c] as i64 + 1);
            }
            for (d, &parent) in internal[c].iter().enumerate() {
                for b in 0..2 {
                    // Bit 1 moves to the lower position, matching the matrix walk.
                    let x = 2 * d + (1 - b);
                    let child = if x < h[c] {
                        leaves[c][x]
                    } else {
                        internal[c + 1][x - h[c]]
                    };
                    encoding[parent + b] = child as i64;
                }
            }
        }
        debug!(outcomes = n, k, l, states = encoding.len(), "packed DDG encoding");
        Self::new(encoding, n, k)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn encoding(&self) -> &[i64] {
        &self.encoding
    }

    /// Walk the tree, returning the label of the leaf reached.
    pub fn sample<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        let enc = &self.encoding;
        if enc.len() == 1 {
            return (-enc[0]) as usize;
        }
        let mut c = 0usize;
        loop {
            c = enc[c + usize::from(bits.next_bit())] as usize;
            if enc[c] < 0 {
                return (-enc[c]) as usize;
            }
        }
    }

    /// Walk the tree, restarting from the root on any label `>= n` (the
    /// reject leaf).
    pub fn sample_with_retry<B: BitStream + ?Sized>(&self, bits: &mut B) -> usize {
        let enc = &self.encoding;
        let mut c = 0usize;
        loop {
            c = enc[c + usize::from(bits.next_bit())] as usize;
            let s = -enc[c];
            if s > 0 {
                if (s as usize) < self.n {
                    return s as usize;
                }
                c = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{ddg_matrix, ky_matrix, Weights};
    use crate::flip::{BitSource, ReplayBits};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bitstrings(k: usize) -> Vec<ReplayBits> {
        (0..1u32 << k)
            .map(|w| ReplayBits::new((0..k).rev().map(move |i| (w >> i) & 1 == 1)))
            .collect()
    }

    fn chi2(counts: &[usize], probs: &[f64]) -> f64 {
        let total: usize = counts.iter().sum();
        counts
            .iter()
            .zip(probs)
            .filter(|(_, &p)| p > 0.0)
            .map(|(&c, &p)| {
                let e = total as f64 * p;
                (c as f64 - e).powi(2) / e
            })
            .sum()
    }

    #[test]
    fn representations_agree_on_every_path() {
        let matrix = ddg_matrix(&[3, 2, 1, 7, 2, 1], 4, 4).expect("valid numerators");
        let cached = DdgMatrixCached::from_matrix(&matrix);
        let encoding = DdgEncoding::from_matrix(&matrix);

        let mut counts = [0usize; 6];
        for bits in bitstrings(4) {
            let a = matrix.sample(&mut bits.clone());
            let b = cached.sample(&mut bits.clone());
            let c = encoding.sample(&mut bits.clone());
            assert_eq!(a, b);
            assert_eq!(a, c);
            counts[a - 1] += 1;
        }
        assert_eq!(counts, [3, 2, 1, 7, 2, 1]);
    }

    #[test]
    fn hand_packed_quarter_split() {
        // 1/4 = 0.01, 3/4 = 0.11
        let matrix = ddg_matrix(&[1, 3], 2, 2).expect("valid numerators");
        let encoding = DdgEncoding::from_matrix(&matrix);
        assert_eq!(encoding.encoding(), &[3, 2, -2, 6, 5, -1, -2]);

        let mut bits: ReplayBits = "1".parse().expect("bits");
        assert_eq!(encoding.sample(&mut bits), 2);
        let mut bits: ReplayBits = "01".parse().expect("bits");
        assert_eq!(encoding.sample(&mut bits), 1);
        let mut bits: ReplayBits = "00".parse().expect("bits");
        assert_eq!(encoding.sample(&mut bits), 2);
    }

    #[test]
    fn point_mass_is_deterministic() {
        let matrix = ddg_matrix(&[0, 31], 5, 0).expect("valid numerators");
        assert_eq!((matrix.k(), matrix.l()), (1, 0));
        let cached = DdgMatrixCached::from_matrix(&matrix);
        let encoding = DdgEncoding::from_matrix(&matrix);

        let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(10));
        for _ in 0..2_000 {
            assert_eq!(matrix.sample(&mut src), 2);
            assert_eq!(cached.sample(&mut src), 2);
            assert_eq!(encoding.sample(&mut src), 2);
        }
    }

    #[test]
    fn single_outcome_consumes_nothing() {
        let matrix = DdgMatrix::new(vec![vec![true]], 1, 0);
        let cached = DdgMatrixCached::from_matrix(&matrix);
        let encoding = DdgEncoding::from_matrix(&matrix);
        assert_eq!(encoding.encoding(), &[-1]);

        let mut bits = ReplayBits::new([]);
        assert_eq!(matrix.sample(&mut bits), 1);
        assert_eq!(cached.sample(&mut bits), 1);
        assert_eq!(encoding.sample(&mut bits), 1);
        assert_eq!(bits.consumed(), 0);
    }

    #[test]
    fn repeating_expansion_matches_target() {
        // 3/15 and 12/15 repeat with period 4 from the root.
        let matrix = ddg_matrix(&[3, 12], 4, 0).expect("valid numerators");
        let cached = DdgMatrixCached::from_matrix(&matrix);
        let encoding = DdgEncoding::from_matrix(&matrix);
        let probs = [0.2, 0.8];

        let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(10));
        let mut counts = [[0usize; 2]; 3];
        for _ in 0..20_000 {
            counts[0][matrix.sample(&mut src) - 1] += 1;
            counts[1][cached.sample(&mut src) - 1] += 1;
            counts[2][encoding.sample(&mut src) - 1] += 1;
        }
        for c in &counts {
            // df = 1
            let stat = chi2(c, &probs);
            assert!(stat < 20.0, "chi2={stat:.2} counts={c:?}");
        }
    }

    #[test]
    fn expected_cost_within_entropy_plus_two() {
        let weights = Weights::new(&[1, 1, 1]).expect("weights");
        let encoding = DdgEncoding::from_matrix(&ky_matrix(&weights).expect("matrix"));
        let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(4));
        let draws = 20_000;
        for _ in 0..draws {
            encoding.sample(&mut src);
        }
        let per_draw = src.bits() as f64 / draws as f64;
        assert!(per_draw < weights.entropy() + 2.0, "per_draw={per_draw}");
    }

    #[test]
    fn retry_skips_reject_row() {
        // Outcomes 1/8, 5/8, reject 2/8.
        let matrix = ddg_matrix(&[1, 5, 2], 3, 3).expect("valid numerators");
        let cached = DdgMatrixCached::from_matrix(&matrix);
        let encoding = DdgEncoding::from_matrix(&matrix);

        let mut src = BitSource::new(ChaCha8Rng::seed_from_u64(77));
        let mut counts = [0usize; 2];
        for _ in 0..30_000 {
            let a = matrix.sample_with_retry(&mut src);
            let b = cached.sample_with_retry(&mut src);
            let c = encoding.sample_with_retry(&mut src);
            for s in [a, b, c] {
                assert!((1..=2).contains(&s), "reject leaked: {s}");
                counts[s - 1] += 1;
            }
        }
        let stat = chi2(&counts, &[1.0 / 6.0, 5.0 / 6.0]);
        assert!(stat < 20.0, "chi2={stat:.2} counts={counts:?}");
    }
}

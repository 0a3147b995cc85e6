//! Binary search over cumulative tables.
//!
//! Both searches take a non-decreasing cumulative array `cdf` with
//! `cdf[0] == 0`, where outcome `j` (0-indexed) owns `[cdf[j], cdf[j+1])`.

/// Exact lookup: the `j` with `cdf[j] <= x < cdf[j+1]`.
///
/// Returns `None` when `x` lies below `cdf[0]` or at/above the last entry.
/// Empty intervals (repeated entries) are never returned.
pub fn search(cdf: &[u64], x: u64) -> Option<usize> {
    if cdf.is_empty() {
        return None;
    }
    let mut l = 0usize;
    let mut r = cdf.len() - 1;
    while l <= r {
        let mid = l + (r - l) / 2;
        if mid > 0 && cdf[mid - 1] <= x && x < cdf[mid] {
            return Some(mid - 1);
        } else if cdf[mid] <= x {
            l = mid + 1;
        } else if mid == 0 {
            return None;
        } else {
            r = mid - 1;
        }
    }
    None
}

/// Rational-interval resolution.
///
/// Looks for the outcome whose cell `[cdf[j]/cdf_denominator,
/// cdf[j+1]/cdf_denominator)` contains the whole interval
/// `[alpha/denominator, beta/denominator)`. Returns `None` while the
/// interval still straddles a cell boundary.
///
/// Comparisons are done by cross-multiplying in `u128`, so no precision is
/// lost.
pub fn search_nested(
    cdf: &[u64],
    cdf_denominator: u64,
    alpha: u64,
    beta: u64,
    denominator: u64,
) -> Option<usize> {
    if cdf.is_empty() {
        return None;
    }
    let common_a = u128::from(alpha) * u128::from(cdf_denominator);
    let common_b = u128::from(beta) * u128::from(cdf_denominator);
    let scaled = |j: usize| u128::from(cdf[j]) * u128::from(denominator);

    let mut l = 0usize;
    let mut r = cdf.len() - 1;
    while l <= r {
        let mid = l + (r - l) / 2;
        if mid > 0 && scaled(mid - 1) <= common_a && common_b <= scaled(mid) {
            return Some(mid - 1);
        } else if scaled(mid) <= common_a {
            l = mid + 1;
        } else if mid == 0 {
            return None;
        } else {
            r = mid - 1;
        }
    }
    None
}

//! Binary expansions of rationals.
//!
//! A rational `M/Z` in lowest terms with `Z = 2^w * Z'` (`Z'` odd) has a
//! binary expansion with a preperiod of `l = w` digits followed by a block
//! of `ord_{Z'}(2)` digits that repeats forever. Writing `k` for the total
//! length of preperiod plus one period, every such fraction can be written
//! as `M'/Zkl` with `Zkl = 2^k - 2^l` (or `2^k` when `l == k`, the dyadic
//! case). DDG matrices store exactly these `k` digits per outcome.

/// Smallest `p` with `2^p >= x` (`0` for `x <= 1`).
pub fn ceil_log2(x: u64) -> u32 {
    if x <= 1 {
        0
    } else {
        64 - (x - 1).leading_zeros()
    }
}

/// Multiplicative order of 2 modulo odd `m`: the least `e >= 1` with
/// `2^e = 1 (mod m)`. Takes `O(m)` steps in the worst case.
///
/// # Panics
///
/// Panics if `m` is even.
pub fn order_of_two(m: u64) -> u32 {
    assert!(m % 2 == 1, "order_of_two: modulus must be odd (got {m})");
    order_within(m, u32::MAX).unwrap_or(u32::MAX)
}

fn order_within(m: u64, limit: u32) -> Option<u32> {
    if m == 1 {
        return Some(1);
    }
    let m = u128::from(m);
    let mut x = 2 % m;
    let mut e = 1u32;
    while x != 1 {
        if e >= limit {
            return None;
        }
        x = (x << 1) % m;
        e += 1;
    }
    Some(e)
}

/// `(k, l)` for denominator `z`: `l` preperiod digits, `k - l` period digits.
///
/// `z == 1` is treated as the repeating expansion `0.111...`, i.e. `(1, 0)`.
///
/// # Panics
///
/// Panics if `z == 0`.
pub fn binary_expansion_length(z: u64) -> (u32, u32) {
    assert!(z > 0, "binary_expansion_length: denominator must be > 0");
    if z == 1 {
        return (1, 0);
    }
    let w = z.trailing_zeros();
    let odd = z >> w;
    if odd == 1 {
        (w, w)
    } else {
        (order_of_two(odd) + w, w)
    }
}

/// [`binary_expansion_length`], giving up once `k` would exceed `max_k`.
///
/// The period of `1/z` can be as long as `z - 1`; builders use this to
/// refuse trees that would not fit in memory.
pub fn bounded_expansion_length(z: u64, max_k: u32) -> Option<(u32, u32)> {
    assert!(z > 0, "bounded_expansion_length: denominator must be > 0");
    if z == 1 {
        return Some((1, 0));
    }
    let w = z.trailing_zeros();
    let odd = z >> w;
    let (k, l) = if odd == 1 {
        (w, w)
    } else {
        (order_within(odd, max_k.saturating_sub(w))? + w, w)
    };
    (k <= max_k).then_some((k, l))
}

/// `Zkl = 2^k - 2^l` for `l < k`, and `2^k` for `l == k`.
///
/// Returns `None` if the value does not fit in `u64`.
pub fn zkl(k: u32, l: u32) -> Option<u64> {
    debug_assert!(l <= k);
    let high = 1u64.checked_shl(k)?;
    if l < k {
        Some(high - (1u64 << l))
    } else {
        Some(high)
    }
}

/// First `k` binary digits of `m/z` (`m <= z`), by long division.
///
/// `m == z` yields all ones, the repeating expansion of 1.
pub fn binary_digits(m: u64, z: u64, k: u32) -> Vec<bool> {
    debug_assert!(m <= z && z > 0);
    let z = u128::from(z);
    let mut x = u128::from(m);
    (0..k)
        .map(|_| {
            x <<= 1;
            if x >= z {
                x -= z;
                true
            } else {
                false
            }
        })
        .collect()
}

/// Reduce numerators over `Zkl` to the shortest equivalent `(k, l)` system.
///
/// - An outcome holding all the mass collapses to `(1, 0)`, i.e. `0.111...`.
/// - All-even numerators in a system with a preperiod drop one preperiod digit.
/// - Equal numerators whose share is a power of two become dyadic.
///
/// `ms` must sum to `Zkl`; otherwise the input is returned unchanged.
pub fn reduce_fractions(ms: &[u64], k: u32, l: u32) -> (Vec<u64>, u32, u32) {
    let Some(z) = zkl(k, l) else {
        return (ms.to_vec(), k, l);
    };
    if ms.iter().any(|&m| m == z) {
        return (ms.iter().map(|&m| m / z).collect(), 1, 0);
    }
    if l == 0 {
        return (ms.to_vec(), k, l);
    }
    if ms.iter().all(|&m| m % 2 == 0) {
        let halved: Vec<u64> = ms.iter().map(|&m| m / 2).collect();
        return reduce_fractions(&halved, k - 1, l - 1);
    }
    if let Some(&first) = ms.first() {
        if first > 0 && ms.iter().all(|&m| m == first) && z % first == 0 {
            let share = z / first;
            if share.is_power_of_two() {
                let base = share.trailing_zeros();
                return (vec![1; ms.len()], base, base);
            }
        }
    }
    (ms.to_vec(), k, l)
}

//! Unbiased random bits.
//!
//! Every sampler in this crate consumes randomness one fair bit at a time
//! through the [`BitStream`] trait. [`BitSource`] buffers one machine word
//! from a `rand` generator and hands its bits out most-significant first,
//! counting how many words it had to draw: that count is the entropy cost
//! reported by benchmarks.
//!
//! The stream is always passed explicitly, so each thread (or each
//! reproducible experiment) owns its own source.
//!
//! ## References
//!
//! - Lumbroso (2013): *Optimal Discrete Uniform Generation from Coin Flips,
//!   and Applications* (lazy bit buffering).

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::SamplerError;

/// A source of independent unbiased bits.
pub trait BitStream {
    /// Draw the next bit.
    fn next_bit(&mut self) -> bool;

    /// Uniform integer in `[0, 2^k)`, assembled most-significant bit first.
    ///
    /// `k == 0` consumes nothing and returns `0`.
    #[inline]
    fn next_uniform(&mut self, k: u32) -> u64 {
        debug_assert!(k <= 64, "next_uniform: k must be <= 64");
        let mut n = 0u64;
        for _ in 0..k {
            n = (n << 1) | u64::from(self.next_bit());
        }
        n
    }
}

impl<B: BitStream + ?Sized> BitStream for &mut B {
    #[inline]
    fn next_bit(&mut self) -> bool {
        (**self).next_bit()
    }
}

/// Lazily buffered bits drawn from a word-at-a-time generator.
#[derive(Debug, Clone)]
pub struct BitSource<R = StdRng> {
    rng: R,
    word: u64,
    pos: u32,
    width: u32,
    calls: u64,
    bits: u64,
}

impl<R: RngCore> BitSource<R> {
    /// Wrap `rng`, using all 64 bits of every word.
    pub fn new(rng: R) -> Self {
        Self::with_word_bits(rng, 64)
    }

    /// Wrap `rng`, using only the low `width` bits of every word.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= width <= 64`.
    pub fn with_word_bits(rng: R, width: u32) -> Self {
        assert!(
            (1..=64).contains(&width),
            "BitSource: word width must be in 1..=64 (got {width})"
        );
        Self {
            rng,
            word: 0,
            pos: 0,
            width,
            calls: 0,
            bits: 0,
        }
    }

    /// Number of words drawn from the underlying generator.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Number of bits handed out so far.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Usable bits per generator word.
    pub fn word_bits(&self) -> u32 {
        self.width
    }

    /// Recover the underlying generator, discarding any buffered bits.
    pub fn into_inner(self) -> R {
        self.rng
    }

    fn refill(&mut self) {
        self.calls += 1;
        let word = self.rng.next_u64();
        self.word = if self.width == 64 {
            word
        } else {
            word & ((1u64 << self.width) - 1)
        };
        self.pos = self.width;
    }
}

impl BitSource<StdRng> {
    /// Deterministic source, for tests and reproducible runs.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: RngCore> BitStream for BitSource<R> {
    #[inline]
    fn next_bit(&mut self) -> bool {
        if self.pos == 0 {
            self.refill();
        }
        self.pos -= 1;
        self.bits += 1;
        (self.word >> self.pos) & 1 == 1
    }
}

/// Replays a fixed sequence of bits.
///
/// Useful for walking a sampler by hand. Drawing past the end panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayBits {
    bits: Vec<bool>,
    pos: usize,
}

impl ReplayBits {
    /// Replay `bits` in order.
    pub fn new<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        Self {
            bits: bits.into_iter().collect(),
            pos: 0,
        }
    }

    /// Bits consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Bits left to replay.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }
}

impl FromStr for ReplayBits {
    type Err = SamplerError;

    /// Parse a string of `0`/`1` characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .enumerate()
            .map(|(index, found)| match found {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(SamplerError::InvalidBit { index, found }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bits, pos: 0 })
    }
}

impl BitStream for ReplayBits {
    /// # Panics
    ///
    /// Panics once the sequence is exhausted.
    #[inline]
    fn next_bit(&mut self) -> bool {
        let Some(&bit) = self.bits.get(self.pos) else {
            panic!("ReplayBits: exhausted after {} bits", self.pos);
        };
        self.pos += 1;
        bit
    }
}

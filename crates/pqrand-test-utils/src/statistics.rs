// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Statistical randomness checks.
//!
//! Each check reduces its input to a standard-normal score and rejects at a
//! two-sided significance of 10^-6, so a real CSPRNG fails a single check
//! about once in half a million runs.
//!
//! - [`monobit`]: NIST SP 800-22 frequency test
//! - [`runs`]: NIST SP 800-22 runs test
//! - [`chi_square_bytes`]: byte histogram against uniform, two-sided so that
//!   suspiciously perfect histograms fail too
//! - [`repetition`]: duplicate aligned blocks

use std::collections::HashSet;

/// Two-sided standard-normal critical value for alpha = 10^-6.
pub const CRITICAL_Z: f64 = 4.891_638;

/// Result of a statistical check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Test statistic (a z-score, or a count for [`repetition`]).
    pub statistic: f64,
    /// Whether the input is consistent with uniform randomness.
    pub passed: bool,
}

impl Verdict {
    fn from_z(z: f64) -> Self {
        Self {
            statistic: z,
            passed: z.is_finite() && z.abs() < CRITICAL_Z,
        }
    }

    fn rejected(statistic: f64) -> Self {
        Self {
            statistic,
            passed: false,
        }
    }
}

/// Iterates the bits of `bytes`, least significant bit of each byte first.
pub fn bits(bytes: &[u8]) -> impl Iterator<Item = bool> + '_ {
    bytes
        .iter()
        .flat_map(|byte| (0..8).map(move |i| (byte >> i) & 1 == 1))
}

/// Iterates bit `k` (0 = least significant) of every byte.
pub fn bit_plane(bytes: &[u8], k: u32) -> impl Iterator<Item = bool> + '_ {
    assert!(k < 8, "bit index out of range");
    bytes.iter().map(move |byte| (byte >> k) & 1 == 1)
}

/// Frequency (monobit) test.
///
/// `z = (#ones - #zeros) / sqrt(n)` over all `n` bits.
pub fn monobit(bytes: &[u8]) -> Verdict {
    let n = (bytes.len() * 8) as f64;
    if n == 0.0 {
        return Verdict::rejected(f64::NAN);
    }

    let ones: u64 = bytes.iter().map(|byte| byte.count_ones() as u64).sum();
    let sum = 2.0 * ones as f64 - n;

    Verdict::from_z(sum / n.sqrt())
}

/// Runs test over an arbitrary bit stream.
///
/// Counts maximal runs of identical bits and compares against the expected
/// `2 n pi (1 - pi)`. Streams failing the frequency prerequisite
/// `|pi - 1/2| < 2 / sqrt(n)` are rejected outright.
pub fn runs(bits: impl IntoIterator<Item = bool>) -> Verdict {
    let mut n = 0u64;
    let mut ones = 0u64;
    let mut runs = 0u64;
    let mut previous = None;

    for bit in bits {
        n += 1;
        if bit {
            ones += 1;
        }
        if previous != Some(bit) {
            runs += 1;
        }
        previous = Some(bit);
    }

    if n < 2 {
        return Verdict::rejected(f64::NAN);
    }

    let n = n as f64;
    let pi = ones as f64 / n;
    if (pi - 0.5).abs() >= 2.0 / n.sqrt() {
        return Verdict::rejected(f64::INFINITY);
    }

    let spread = pi * (1.0 - pi);
    let expected = 2.0 * n * spread;

    Verdict::from_z((runs as f64 - expected) / (2.0 * n.sqrt() * spread))
}

/// Chi-square test of the byte histogram against uniform (255 degrees of
/// freedom), normalised with the Wilson-Hilferty transform.
///
/// Needs at least a few thousand bytes to be meaningful.
pub fn chi_square_bytes(bytes: &[u8]) -> Verdict {
    if bytes.is_empty() {
        return Verdict::rejected(f64::NAN);
    }

    let mut counts = [0u64; 256];
    for &byte in bytes {
        counts[byte as usize] += 1;
    }

    let expected = bytes.len() as f64 / 256.0;
    let chi_squared: f64 = counts
        .iter()
        .map(|&count| {
            let diff = count as f64 - expected;
            diff * diff / expected
        })
        .sum();

    let df = 255.0;
    let scale = 2.0 / (9.0 * df);
    let z = ((chi_squared / df).cbrt() - (1.0 - scale)) / scale.sqrt();

    Verdict::from_z(z)
}

/// Counts aligned `block`-byte chunks that duplicate an earlier chunk.
///
/// Any duplicate fails; for 16 bytes or more a duplicate from a CSPRNG is
/// out of reach.
pub fn repetition(bytes: &[u8], block: usize) -> Verdict {
    assert!(block > 0, "block size must be non-zero");

    let mut seen = HashSet::new();
    let duplicates = bytes
        .chunks_exact(block)
        .filter(|chunk| !seen.insert(*chunk))
        .count();

    Verdict {
        statistic: duplicates as f64,
        passed: duplicates == 0,
    }
}

// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for pqrand crates.
//!
//! - [`statistics`]: frequency, runs, chi-square and repetition checks
//! - [`Lcg`]: the demonstration linear congruential generator, kept only so
//!   tests can show it failing the checks a CSPRNG passes
//! - [`hex_to_bytes`]: decoding of known-answer vectors
//!
//! ## License
//!
//! GPL-3.0-only

#![warn(missing_docs)]

mod lcg;
pub mod statistics;

pub use lcg::Lcg;

/// Decodes a hex string (either case) into bytes.
///
/// # Panics
///
/// Panics on odd length or non-hex characters.
pub fn hex_to_bytes(hex: &str) -> Vec<u8> {
    assert!(hex.len() % 2 == 0, "hex string has odd length");

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("valid hex"))
        .collect()
}

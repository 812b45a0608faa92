// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # pqrand-kat
//!
//! The AES-256 CTR DRBG from the NIST PQC reference `rng.c`, used to
//! regenerate the `seed = ...` lines of `.rsp` known-answer files.
//!
//! This generator is fully deterministic: anyone holding the 48-byte entropy
//! input can reproduce every byte. It is a separate type from
//! `pqrand::SecureRandomSource` and implements neither
//! `pqrand::EntropySource` nor `rand_core::CryptoRng`, so it cannot stand in
//! for a secure source.
//!
//! ## Example
//!
//! ```rust
//! use pqrand_kat::KatDrbg;
//!
//! let mut entropy_input = [0u8; 48];
//! for (i, byte) in entropy_input.iter_mut().enumerate() {
//!     *byte = i as u8;
//! }
//!
//! let mut drbg = KatDrbg::new(&entropy_input, None);
//! let mut seed = [0u8; 48];
//! drbg.generate(&mut seed).expect("Failed to generate(..)");
//!
//! assert_eq!(&seed[..4], &[0x06, 0x15, 0x50, 0x23]);
//! ```

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod drbg;
mod error;

pub use drbg::{ENTROPY_INPUT_SIZE, KatDrbg, RESEED_INTERVAL};
pub use error::KatError;

// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # pqrand
//!
//! Cryptographically secure random bytes for post-quantum primitives.
//!
//! Replaces the demonstration linear congruential `randombytes` with a
//! ChaCha20 generator seeded from the operating system, re-keyed
//! periodically and after `fork()`, and failing loudly instead of degrading
//! when the OS cannot supply entropy.
//!
//! ## Core Types
//!
//! - [`SecureRandomSource`]: Mutex-protected, lazily seeded, fork-safe CSPRNG
//! - [`SystemEntropySource`]: OS-level entropy with a bounded wait
//! - [`SourceConfig`]: Reseed interval
//! - [`GlobalRng`]: `rand_core` handle to the process-wide source
//!
//! ## Traits
//!
//! - [`EntropySource`]: Interface for entropy sources and CSPRNGs
//!
//! ## Example
//!
//! ```rust
//! use pqrand::{EntropySource, SecureRandomSource, SystemEntropySource};
//!
//! // Process-wide source
//! let mut seed = [0u8; 32];
//! pqrand::fill(&mut seed).expect("Failed to fill(..)");
//!
//! // Dedicated source
//! let source = SecureRandomSource::new(SystemEntropySource::new());
//! let nonce = source.next_u64().expect("Failed to next_u64()");
//! # let _ = nonce;
//! ```
//!
//! ## Platform Support
//!
//! - Linux/Android: `getrandom()` syscall via `libc`, `GRND_NONBLOCK` for the bounded wait
//! - macOS/iOS: `getentropy()` via `getrandom`
//! - Windows: `ProcessPrng` via `getrandom`
//! - WASI / wasm32: `random_get` / `crypto.getRandomValues` via `getrandom`

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

mod config;
mod error;
mod fork;
mod global;
mod source;
mod support;
mod system;
mod traits;

pub use config::{DEFAULT_RESEED_INTERVAL, SourceConfig};
pub use error::EntropyError;
pub use global::{GlobalRng, fill, global};
pub use source::SecureRandomSource;
pub use system::SystemEntropySource;
pub use traits::EntropySource;

#[cfg(any(test, feature = "test_utils"))]
pub use support::test_utils;

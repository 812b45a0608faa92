// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::num::NonZeroU64;

/// Bytes of output after which the generator is re-keyed by default.
pub const DEFAULT_RESEED_INTERVAL: NonZeroU64 = match NonZeroU64::new(64 * 1024) {
    Some(interval) => interval,
    None => unreachable!(),
};

/// Tuning for a [`SecureRandomSource`](crate::SecureRandomSource).
///
/// # Example
///
/// ```rust
/// use core::num::NonZeroU64;
/// use pqrand::SourceConfig;
///
/// let config = SourceConfig::new()
///     .with_reseed_interval(NonZeroU64::new(4096).expect("non-zero"));
///
/// assert_eq!(config.reseed_interval(), 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    reseed_interval: NonZeroU64,
}

impl SourceConfig {
    /// Creates the default configuration (re-key every 64 KiB).
    pub const fn new() -> Self {
        Self {
            reseed_interval: DEFAULT_RESEED_INTERVAL,
        }
    }

    /// Sets how many output bytes may be produced from one seed.
    pub const fn with_reseed_interval(mut self, bytes: NonZeroU64) -> Self {
        self.reseed_interval = bytes;
        self
    }

    /// Returns the reseed interval in bytes.
    pub const fn reseed_interval(&self) -> u64 {
        self.reseed_interval.get()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::new()
    }
}

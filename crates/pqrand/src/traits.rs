// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::error::EntropyError;

/// Trait for cryptographically secure sources of random bytes.
///
/// Implementations must provide randomness suitable for cryptographic operations
/// (keys, nonces, salts). Typically backed by the OS CSPRNG, either directly
/// ([`SystemEntropySource`](crate::SystemEntropySource)) or through a generator
/// seeded from it ([`SecureRandomSource`](crate::SecureRandomSource)).
pub trait EntropySource {
    /// Fills the destination buffer with cryptographically secure random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError::EntropyUnavailable`] if the underlying entropy
    /// source is unavailable or fails to generate random data.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), EntropyError>;

    /// Returns a random `u32` assembled from four little-endian bytes.
    fn next_u32(&self) -> Result<u32, EntropyError> {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf)?;

        Ok(u32::from_le_bytes(buf))
    }

    /// Returns a random `u64` assembled from eight little-endian bytes.
    fn next_u64(&self) -> Result<u64, EntropyError> {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf)?;

        Ok(u64::from_le_bytes(buf))
    }
}

// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Reseeding ChaCha20 generator seeded from an [`EntropySource`].
//!
//! # Security Model
//!
//! - **Seeding**: 32 bytes from the entropy source key a ChaCha20 stream.
//!   The seed buffer is zeroized immediately after keying.
//! - **Reseeding**: the generator is re-keyed from the entropy source when it
//!   was never seeded, when a fork is detected, and after
//!   [`SourceConfig::reseed_interval`] bytes of output.
//! - **Key erasure**: after every request the generator replaces its own key
//!   with 32 bytes of its output, so a later state capture cannot reproduce
//!   bytes already handed out.
//! - **Disposal**: discarded generators are overwritten in place with a
//!   volatile write, since `ChaCha20Rng` does not zeroize itself.
//! - **Failure**: if the entropy source fails, the whole destination buffer is
//!   zeroized, the generator is discarded and
//!   [`EntropyError::EntropyUnavailable`] is returned. There is no weaker
//!   fallback.
//!
//! # Locking
//!
//! The state mutex is only held while keystream is generated, at most one
//! reseed interval of output at a time. Entropy is read with the lock
//! released and the new key installed afterwards, so a `fork()` from another
//! thread never leaves the child with a lock held across a blocking read.

use core::fmt;
use core::sync::atomic::{Ordering, compiler_fence};
use std::sync::{Mutex, MutexGuard};

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use zeroize::{Zeroize, Zeroizing};

use crate::config::SourceConfig;
use crate::error::EntropyError;
use crate::fork::ForkMarker;
use crate::system::SystemEntropySource;
use crate::traits::EntropySource;

const SEED_SIZE: usize = 32;

/// Why a generator is being (re)keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReseedReason {
    Initial,
    Fork,
    Interval,
}

impl fmt::Display for ReseedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Fork => write!(f, "fork"),
            Self::Interval => write!(f, "interval"),
        }
    }
}

#[derive(Clone)]
pub(crate) struct GeneratorState {
    rng: Option<ChaCha20Rng>,
    bytes_since_reseed: u64,
    fork_marker: ForkMarker,
}

impl GeneratorState {
    const fn new() -> Self {
        Self {
            rng: None,
            bytes_since_reseed: 0,
            fork_marker: ForkMarker::UNSET,
        }
    }

    fn reseed_reason(&self, marker: ForkMarker, interval: u64) -> Option<ReseedReason> {
        if self.rng.is_none() {
            Some(ReseedReason::Initial)
        } else if self.fork_marker != marker {
            Some(ReseedReason::Fork)
        } else if self.bytes_since_reseed >= interval {
            Some(ReseedReason::Interval)
        } else {
            None
        }
    }

    fn install(&mut self, seed: &[u8; SEED_SIZE], marker: ForkMarker) {
        self.discard();
        self.rng = Some(ChaCha20Rng::from_seed(*seed));
        self.fork_marker = marker;
    }

    /// Writes as much of `dest` as the reseed budget allows and returns the
    /// number of bytes written.
    fn generate(&mut self, dest: &mut [u8], interval: u64) -> usize {
        let Some(rng) = self.rng.as_mut() else {
            return 0;
        };

        let budget = usize::try_from(interval - self.bytes_since_reseed).unwrap_or(usize::MAX);
        let chunk = dest.len().min(budget);

        rng.fill_bytes(&mut dest[..chunk]);
        self.bytes_since_reseed += chunk as u64;

        chunk
    }

    fn erase_key(&mut self) {
        if let Some(rng) = self.rng.as_mut() {
            let mut next_key = [0u8; SEED_SIZE];
            rng.fill_bytes(&mut next_key);
            *rng = ChaCha20Rng::from_seed(next_key);
            next_key.zeroize();
        }
    }

    fn discard(&mut self) {
        if let Some(rng) = self.rng.as_mut() {
            wipe(rng);
        }
        self.rng = None;
        self.bytes_since_reseed = 0;
    }
}

impl Drop for GeneratorState {
    fn drop(&mut self) {
        self.discard();
    }
}

/// Overwrites a generator's key, counter and keystream buffer in place.
///
/// `ChaCha20Rng` does not zeroize on drop, and a plain store followed by a
/// drop may be elided.
pub(crate) fn wipe(rng: &mut ChaCha20Rng) {
    // SAFETY: `rng` is a valid, aligned, exclusive reference. ChaCha20Rng
    // owns no heap memory, so skipping the old value's drop leaks nothing.
    unsafe { core::ptr::write_volatile(rng, ChaCha20Rng::from_seed([0u8; SEED_SIZE])) };
    compiler_fence(Ordering::SeqCst);
}

impl fmt::Debug for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeneratorState([REDACTED])")
    }
}

/// Cryptographically secure random byte source.
///
/// Owns a ChaCha20 generator behind a mutex. The generator is seeded lazily
/// on the first non-empty request, re-keyed periodically and after `fork()`,
/// and never falls back to a weaker generator.
///
/// # Example
///
/// ```rust
/// use pqrand::{SecureRandomSource, SystemEntropySource};
///
/// let source = SecureRandomSource::new(SystemEntropySource::new());
///
/// let mut key = [0u8; 32];
/// source.fill(&mut key).expect("Failed to fill(..)");
/// ```
pub struct SecureRandomSource<E: EntropySource = SystemEntropySource> {
    entropy: E,
    config: SourceConfig,
    state: Mutex<GeneratorState>,
}

impl<E: EntropySource> SecureRandomSource<E> {
    /// Creates an unseeded source with the default [`SourceConfig`].
    pub const fn new(entropy: E) -> Self {
        Self::with_config(entropy, SourceConfig::new())
    }

    /// Creates an unseeded source with an explicit configuration.
    pub const fn with_config(entropy: E, config: SourceConfig) -> Self {
        Self {
            entropy,
            config,
            state: Mutex::new(GeneratorState::new()),
        }
    }

    /// Returns the configuration this source was built with.
    pub fn config(&self) -> SourceConfig {
        self.config
    }

    /// Returns the entropy source used for (re)seeding.
    pub fn entropy(&self) -> &E {
        &self.entropy
    }

    /// Fills `dest` with cryptographically secure random bytes.
    ///
    /// An empty `dest` is a no-op that succeeds without touching the
    /// generator or the entropy source.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError::EntropyUnavailable`] if the entropy source
    /// cannot be read when a (re)seed is due. `dest` is zeroized in that case.
    pub fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        if dest.is_empty() {
            return Ok(());
        }

        let result = self.fill_chunks(dest);

        if result.is_err() {
            dest.zeroize();
        }

        result
    }

    /// Generates under the lock, one reseed budget at a time. The OS read
    /// for a (re)seed happens with the lock released, so the lock is never
    /// held across a blocking call.
    fn fill_chunks(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let interval = self.config.reseed_interval();
        let mut offset = 0;

        while offset < dest.len() {
            let marker = ForkMarker::current();

            let reason = {
                let mut state = self.lock_state();

                match state.reseed_reason(marker, interval) {
                    Some(reason) => reason,
                    None => {
                        offset += state.generate(&mut dest[offset..], interval);
                        if offset == dest.len() {
                            state.erase_key();
                        }
                        continue;
                    }
                }
            };

            let seed = self.read_seed(reason)?;
            self.lock_state().install(&seed, marker);
            log::debug!("generator seeded ({reason})");
        }

        Ok(())
    }

    fn read_seed(&self, reason: ReseedReason) -> Result<Zeroizing<[u8; SEED_SIZE]>, EntropyError> {
        let mut seed = Zeroizing::new([0u8; SEED_SIZE]);

        if let Err(err) = self.entropy.fill_bytes(&mut seed[..]) {
            self.lock_state().discard();
            log::warn!("generator reseed ({reason}) failed: entropy unavailable");
            return Err(err);
        }

        Ok(seed)
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, GeneratorState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            let mut state = poisoned.into_inner();
            state.discard();
            self.state.clear_poison();

            state
        })
    }

    /// Clones the source including its generator state, as `fork()` would.
    #[cfg(test)]
    pub(crate) fn duplicate_for_test(&self) -> Self
    where
        E: Clone,
    {
        Self {
            entropy: self.entropy.clone(),
            config: self.config,
            state: Mutex::new(self.lock_state().clone()),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_seeded_for_test(&self) -> bool {
        self.lock_state().rng.is_some()
    }

    #[cfg(test)]
    pub(crate) fn bytes_since_reseed_for_test(&self) -> u64 {
        self.lock_state().bytes_since_reseed
    }

    #[cfg(test)]
    pub(crate) fn poison_for_test(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.state.lock();
            panic!("poisoning generator state");
        }));
    }
}

impl<E: EntropySource> EntropySource for SecureRandomSource<E> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        self.fill(dest)
    }
}

impl<E: EntropySource> fmt::Debug for SecureRandomSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureRandomSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

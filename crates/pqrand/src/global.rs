// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Process-wide secure random source.

#[cfg(unix)]
use core::cell::Cell;
#[cfg(unix)]
use std::sync::MutexGuard;

use rand_core::{TryCryptoRng, TryRngCore};

use crate::error::EntropyError;
#[cfg(unix)]
use crate::source::GeneratorState;
use crate::source::SecureRandomSource;
use crate::system::SystemEntropySource;
use crate::traits::EntropySource;

static GLOBAL: SecureRandomSource = SecureRandomSource::new(SystemEntropySource::new());

#[cfg(unix)]
thread_local! {
    /// Guard held by the forking thread between the atfork prepare and
    /// parent/child handlers.
    static FORK_GUARD: Cell<Option<MutexGuard<'static, GeneratorState>>> =
        const { Cell::new(None) };
}

/// Takes the global state lock on the forking thread. The lock is held for
/// at most one reseed interval of keystream generation.
#[cfg(unix)]
pub(crate) fn hold_for_fork() {
    let guard = GLOBAL.lock_state();
    let _ = FORK_GUARD.try_with(move |slot| slot.set(Some(guard)));
}

/// Releases the lock taken by [`hold_for_fork`], in the parent and in the
/// child alike.
#[cfg(unix)]
pub(crate) fn release_after_fork() {
    let _ = FORK_GUARD.try_with(|slot| drop(slot.take()));
}

/// Returns the process-wide source used by [`fill`] and [`GlobalRng`].
pub fn global() -> &'static SecureRandomSource {
    &GLOBAL
}

/// Fills `dest` from the process-wide secure random source.
///
/// The source is seeded from the OS on first use, re-keyed every 64 KiB of
/// output and after `fork()`. An empty `dest` succeeds immediately.
///
/// # Errors
///
/// Returns [`EntropyError::EntropyUnavailable`] if the OS entropy source
/// cannot be read within 10 seconds when a (re)seed is due.
///
/// # Example
///
/// ```rust
/// let mut salt = [0u8; 16];
/// pqrand::fill(&mut salt).expect("Failed to fill(..)");
/// ```
pub fn fill(dest: &mut [u8]) -> Result<(), EntropyError> {
    GLOBAL.fill(dest)
}

/// Handle to the process-wide source for the `rand_core` ecosystem.
///
/// Implements [`TryRngCore`] and [`TryCryptoRng`]; use
/// [`TryRngCore::unwrap_err`] where an infallible `RngCore + CryptoRng` is
/// required.
///
/// # Example
///
/// ```rust
/// use pqrand::GlobalRng;
/// use rand_core::TryRngCore;
///
/// let value = GlobalRng.try_next_u64().expect("Failed to try_next_u64()");
/// # let _ = value;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalRng;

impl TryRngCore for GlobalRng {
    type Error = EntropyError;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        GLOBAL.next_u32()
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        GLOBAL.next_u64()
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
        GLOBAL.fill(dst)
    }
}

impl TryCryptoRng for GlobalRng {}

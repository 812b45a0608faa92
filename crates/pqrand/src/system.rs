// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Operating-system entropy with a bounded wait.
//!
//! On Linux and Android the `getrandom(2)` syscall is called directly through
//! `libc`. When a timeout is configured the call is issued with
//! `GRND_NONBLOCK`, so a freshly booted machine whose pool is not yet
//! initialised surfaces as `EAGAIN` and is retried until the deadline instead
//! of blocking forever. Every other platform goes through the `getrandom`
//! crate.

use core::time::Duration;
use std::time::Instant;

use crate::error::EntropyError;
use crate::traits::EntropySource;

/// Default bound on how long a read may wait for the OS pool.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between retries while the OS pool is not ready.
pub(crate) const RETRY_DELAY: Duration = Duration::from_millis(10);

/// Outcome of a single read from the OS entropy facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    /// `n` bytes were written to the front of the buffer.
    Filled(usize),
    /// The pool is not initialised yet (`EAGAIN` under `GRND_NONBLOCK`).
    NotReady,
    /// Interrupted by a signal before any byte was written.
    Interrupted,
    /// Any other failure.
    Failed,
}

/// System-provided cryptographically secure random number generator.
///
/// Uses the OS-level CSPRNG:
/// - Linux/Android: `getrandom()` syscall
/// - macOS/iOS: `getentropy()` (via `getrandom`)
/// - Windows: `ProcessPrng` (via `getrandom`)
/// - WASI: `random_get` (via `getrandom`)
///
/// The timeout only applies where the platform can report "not ready"
/// without blocking (Linux and Android). Elsewhere the read blocks until the
/// platform answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemEntropySource {
    timeout: Option<Duration>,
}

impl SystemEntropySource {
    /// Creates a source that waits at most 10 seconds for the OS pool.
    pub const fn new() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Creates a source that fails with
    /// [`EntropyError::EntropyUnavailable`] if the OS pool is not ready
    /// within `timeout`.
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Creates a source that blocks until the OS pool is ready.
    pub const fn blocking() -> Self {
        Self { timeout: None }
    }

    /// Returns the configured wait bound, `None` when blocking.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn fill_bytes_with(
        read_fn: &mut dyn FnMut(&mut [u8], bool) -> ReadOutcome,
        dest: &mut [u8],
        timeout: Option<Duration>,
    ) -> Result<(), EntropyError> {
        let nonblocking = timeout.is_some();
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let mut offset = 0;

        while offset < dest.len() {
            match read_fn(&mut dest[offset..], nonblocking) {
                ReadOutcome::Filled(0) | ReadOutcome::Failed => {
                    log::warn!("OS entropy source failed after {offset} bytes");
                    return Err(EntropyError::EntropyUnavailable);
                }
                ReadOutcome::Filled(n) => {
                    offset += n.min(dest.len() - offset);
                }
                ReadOutcome::Interrupted => {
                    log::trace!("OS entropy read interrupted, retrying");
                }
                ReadOutcome::NotReady => {
                    let now = Instant::now();
                    let pause = match deadline {
                        Some(deadline) if now >= deadline => {
                            log::warn!("OS entropy pool not ready within {timeout:?}");
                            return Err(EntropyError::EntropyUnavailable);
                        }
                        Some(deadline) => RETRY_DELAY.min(deadline - now),
                        None => RETRY_DELAY,
                    };

                    log::trace!("OS entropy pool not ready, retrying in {pause:?}");
                    std::thread::sleep(pause);
                }
            }
        }

        Ok(())
    }
}

impl Default for SystemEntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for SystemEntropySource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        Self::fill_bytes_with(&mut read_os, dest, self.timeout)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn read_os(dest: &mut [u8], nonblocking: bool) -> ReadOutcome {
    let flags = if nonblocking { libc::GRND_NONBLOCK } else { 0 };
    let ret = unsafe { libc::getrandom(dest.as_mut_ptr() as *mut libc::c_void, dest.len(), flags) };

    if ret >= 0 {
        return ReadOutcome::Filled(ret as usize);
    }

    match std::io::Error::last_os_error().raw_os_error() {
        Some(libc::EAGAIN) => ReadOutcome::NotReady,
        Some(libc::EINTR) => ReadOutcome::Interrupted,
        _ => ReadOutcome::Failed,
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn read_os(dest: &mut [u8], _nonblocking: bool) -> ReadOutcome {
    match getrandom::fill(dest) {
        Ok(()) => ReadOutcome::Filled(dest.len()),
        Err(_) => ReadOutcome::Failed,
    }
}

// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Fork detection for cached generator state.
//!
//! A child created by `fork()` inherits an exact copy of its parent's memory,
//! including any seeded generator. Two signals are combined to notice this:
//!
//! - **Fork generation**: a process-wide counter bumped by a `pthread_atfork`
//!   child handler with an atomic increment, which is async-signal-safe.
//! - **Process id**: compared as well, for children created without running
//!   atfork handlers (raw `clone`/`vfork` paths).
//!
//! A generator records the [`ForkMarker`] it was seeded under and must reseed
//! whenever the current marker differs.
//!
//! The same handlers hold the process-wide source's state lock across
//! `fork()` (taken in prepare, released in parent and child), so the child
//! never inherits it locked by a thread that does not exist there.

use core::sync::atomic::{AtomicU64, Ordering};
#[cfg(unix)]
use std::sync::Once;

static FORK_GENERATION: AtomicU64 = AtomicU64::new(0);
#[cfg(unix)]
static REGISTER_HANDLER: Once = Once::new();

/// Identifies the process image a generator was seeded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ForkMarker {
    generation: u64,
    pid: u32,
}

impl ForkMarker {
    /// Marker of a generator that was never seeded.
    pub(crate) const UNSET: Self = Self {
        generation: u64::MAX,
        pid: 0,
    };

    /// Returns the marker of the calling process.
    ///
    /// Registers the atfork handler on first use, so any state seeded after
    /// this call is covered by it.
    pub(crate) fn current() -> Self {
        register_handler();

        Self {
            generation: FORK_GENERATION.load(Ordering::Acquire),
            pid: std::process::id(),
        }
    }
}

#[cfg(unix)]
fn register_handler() {
    REGISTER_HANDLER.call_once(|| {
        let ret = unsafe {
            libc::pthread_atfork(
                Some(on_fork_prepare),
                Some(on_fork_parent),
                Some(on_fork_child),
            )
        };

        if ret != 0 {
            log::warn!("pthread_atfork failed ({ret}), relying on process id checks");
        }
    });
}

#[cfg(not(unix))]
fn register_handler() {}

#[cfg(unix)]
unsafe extern "C" fn on_fork_prepare() {
    crate::global::hold_for_fork();
}

#[cfg(unix)]
unsafe extern "C" fn on_fork_parent() {
    crate::global::release_after_fork();
}

#[cfg(unix)]
unsafe extern "C" fn on_fork_child() {
    FORK_GENERATION.fetch_add(1, Ordering::AcqRel);
    crate::global::release_after_fork();
}

/// Bumps the fork generation exactly as the atfork child handler does.
#[cfg(test)]
pub(crate) fn simulate_fork() {
    FORK_GENERATION.fetch_add(1, Ordering::AcqRel);
}

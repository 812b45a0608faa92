// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use thiserror::Error;

/// Errors returned by [`crate::KatDrbg`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum KatError {
    /// More than [`crate::RESEED_INTERVAL`] requests were served since the
    /// last (re)seed.
    #[error("ReseedRequired")]
    ReseedRequired,
}

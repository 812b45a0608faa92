// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use thiserror::Error;

/// Errors that can occur when generating random data.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EntropyError {
    /// The operating system entropy source could not be read within policy.
    ///
    /// Never masked by substituting a weaker generator.
    #[error("EntropyUnavailable")]
    EntropyUnavailable,
}

// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

/// Linear congruential generator emitting the low byte of its state.
///
/// `x = x * 1664525 + 1013904223 (mod 2^64)`, starting from `x = 1`.
///
/// **Not a source of randomness.** The low byte only depends on the low byte
/// of the previous state, so the output repeats every 256 bytes, bit 0
/// strictly alternates, and one observed byte predicts the whole stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Multiplier `a`.
    pub const MULTIPLIER: u64 = 1_664_525;
    /// Increment `c`.
    pub const INCREMENT: u64 = 1_013_904_223;

    /// Creates a generator in its fixed initial state (`x = 1`).
    pub const fn new() -> Self {
        Self { state: 1 }
    }

    /// Creates a generator from an explicit state.
    pub const fn with_state(state: u64) -> Self {
        Self { state }
    }

    /// Returns the current internal state.
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Fills `out` with one state step per byte.
    pub fn fill(&mut self, out: &mut [u8]) {
        for byte in out.iter_mut() {
            self.state = self
                .state
                .wrapping_mul(Self::MULTIPLIER)
                .wrapping_add(Self::INCREMENT);
            *byte = self.state as u8;
        }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new()
    }
}

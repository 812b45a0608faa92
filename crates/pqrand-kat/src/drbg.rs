// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use rand_core::TryRngCore;
use zeroize::Zeroize;

use crate::error::KatError;

/// Length of the entropy input, personalization string and additional input.
pub const ENTROPY_INPUT_SIZE: usize = 48;

/// Maximum number of generate requests between reseeds (2^48).
pub const RESEED_INTERVAL: u64 = 1 << 48;

const KEY_SIZE: usize = 32;
const BLOCK_SIZE: usize = 16;

/// NIST SP 800-90A AES-256 CTR DRBG without derivation function, exactly as
/// the NIST PQC reference `rng.c` implements it.
///
/// State is zeroized on drop.
pub struct KatDrbg {
    key: [u8; KEY_SIZE],
    v: [u8; BLOCK_SIZE],
    reseed_counter: u64,
}

impl KatDrbg {
    /// Instantiates the DRBG (`randombytes_init`).
    ///
    /// The seed material is `entropy_input` XOR `personalization`.
    pub fn new(
        entropy_input: &[u8; ENTROPY_INPUT_SIZE],
        personalization: Option<&[u8; ENTROPY_INPUT_SIZE]>,
    ) -> Self {
        let mut drbg = Self {
            key: [0u8; KEY_SIZE],
            v: [0u8; BLOCK_SIZE],
            reseed_counter: 0,
        };

        drbg.reseed(entropy_input, personalization);
        drbg
    }

    /// Mixes fresh `entropy_input` (XOR `additional_input`) into the state
    /// and resets the reseed counter.
    pub fn reseed(
        &mut self,
        entropy_input: &[u8; ENTROPY_INPUT_SIZE],
        additional_input: Option<&[u8; ENTROPY_INPUT_SIZE]>,
    ) {
        let mut seed_material = *entropy_input;

        if let Some(additional) = additional_input {
            for (byte, mask) in seed_material.iter_mut().zip(additional) {
                *byte ^= mask;
            }
        }

        self.update(Some(&seed_material));
        self.reseed_counter = 1;

        seed_material.zeroize();
    }

    /// Fills `out` with the next DRBG output (`randombytes`).
    ///
    /// # Errors
    ///
    /// Returns [`KatError::ReseedRequired`] once more than
    /// [`RESEED_INTERVAL`] requests were served; `out` is left untouched.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<(), KatError> {
        if self.reseed_counter > RESEED_INTERVAL {
            return Err(KatError::ReseedRequired);
        }

        let cipher = self.cipher();

        for chunk in out.chunks_mut(BLOCK_SIZE) {
            let block = self.next_block(&cipher);
            chunk.copy_from_slice(&block[..chunk.len()]);
        }

        self.update(None);
        self.reseed_counter += 1;

        Ok(())
    }

    /// Number of requests served since the last (re)seed, plus one.
    pub fn reseed_counter(&self) -> u64 {
        self.reseed_counter
    }

    fn update(&mut self, provided_data: Option<&[u8; ENTROPY_INPUT_SIZE]>) {
        let cipher = self.cipher();
        let mut temp = [0u8; ENTROPY_INPUT_SIZE];

        for chunk in temp.chunks_exact_mut(BLOCK_SIZE) {
            chunk.copy_from_slice(&self.next_block(&cipher));
        }

        if let Some(data) = provided_data {
            for (byte, mask) in temp.iter_mut().zip(data) {
                *byte ^= mask;
            }
        }

        self.key.copy_from_slice(&temp[..KEY_SIZE]);
        self.v.copy_from_slice(&temp[KEY_SIZE..]);

        temp.zeroize();
    }

    fn cipher(&self) -> Aes256 {
        Aes256::new(GenericArray::from_slice(&self.key))
    }

    /// Increments V and returns AES-256-ECB(Key, V).
    fn next_block(&mut self, cipher: &Aes256) -> [u8; BLOCK_SIZE] {
        self.increment_v();

        let mut block = GenericArray::clone_from_slice(&self.v);
        cipher.encrypt_block(&mut block);

        let mut out = [0u8; BLOCK_SIZE];
        out.copy_from_slice(&block);
        out
    }

    /// Big-endian increment of V, wrapping at 2^128.
    fn increment_v(&mut self) {
        for byte in self.v.iter_mut().rev() {
            let (next, overflow) = byte.overflowing_add(1);
            *byte = next;
            if !overflow {
                break;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_reseed_counter_for_test(&mut self, reseed_counter: u64) {
        self.reseed_counter = reseed_counter;
    }

    #[cfg(test)]
    pub(crate) fn v_for_test(&self) -> [u8; BLOCK_SIZE] {
        self.v
    }

    #[cfg(test)]
    pub(crate) fn increment_v_for_test(&mut self) {
        self.increment_v();
    }

    #[cfg(test)]
    pub(crate) fn set_v_for_test(&mut self, v: [u8; BLOCK_SIZE]) {
        self.v = v;
    }
}

impl TryRngCore for KatDrbg {
    type Error = KatError;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        let mut bytes = [0u8; 4];
        self.generate(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        let mut bytes = [0u8; 8];
        self.generate(&mut bytes)?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Self::Error> {
        self.generate(dest)
    }
}

impl Drop for KatDrbg {
    fn drop(&mut self) {
        self.key.zeroize();
        self.v.zeroize();
        self.reseed_counter.zeroize();
    }
}

impl fmt::Debug for KatDrbg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KatDrbg")
            .field("reseed_counter", &self.reseed_counter)
            .finish_non_exhaustive()
    }
}

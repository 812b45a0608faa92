// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # pqrand-ffi
//!
//! C ABI over the [`pqrand`] process-wide source, for PQClean-style C code
//! that links against a `randombytes` symbol.
//!
//! Both entry points return `0` on success and `-1` when the OS entropy
//! source is unavailable. They never panic across the FFI boundary and never
//! hand back bytes from a weaker generator.
//!
//! The matching C declarations live in `include/randombytes.h`.

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

use core::slice;

use pqrand::EntropySource;

/// Status returned on success.
pub const RANDOMBYTES_OK: libc::c_int = 0;
/// Status returned when no secure bytes could be produced.
pub const RANDOMBYTES_ERR: libc::c_int = -1;

/// Fills `out[..outlen]` with cryptographically secure random bytes.
///
/// Returns [`RANDOMBYTES_OK`] on success. Returns [`RANDOMBYTES_ERR`] if
/// `out` is null while `outlen > 0`, or if entropy is unavailable; in the
/// latter case the buffer is zeroed. `outlen == 0` succeeds without touching
/// `out`, which may then be null.
///
/// # Safety
///
/// When `outlen > 0`, `out` must be valid for writes of `outlen` bytes and
/// must not be accessed by anything else for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn randombytes(out: *mut u8, outlen: libc::size_t) -> libc::c_int {
    // SAFETY: forwarded caller contract.
    unsafe { fill_raw(pqrand::global(), out, outlen) }
}

/// Same contract as [`randombytes`], exported under the symbol name
/// pqcrypto's C sources call.
///
/// # Safety
///
/// See [`randombytes`].
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn PQCRYPTO_RUST_randombytes(
    buf: *mut u8,
    len: libc::size_t,
) -> libc::c_int {
    // SAFETY: forwarded caller contract.
    unsafe { fill_raw(pqrand::global(), buf, len) }
}

/// Fills `ptr[..len]` from `source` and maps the outcome to a C status.
///
/// # Safety
///
/// Same contract as [`randombytes`].
pub(crate) unsafe fn fill_raw<E: EntropySource>(
    source: &E,
    ptr: *mut u8,
    len: usize,
) -> libc::c_int {
    if len == 0 {
        return RANDOMBYTES_OK;
    }

    if ptr.is_null() {
        log::warn!("randombytes called with a null buffer of {len} bytes");
        return RANDOMBYTES_ERR;
    }

    // SAFETY: ptr is non-null and the caller guarantees len writable bytes.
    let dest = unsafe { slice::from_raw_parts_mut(ptr, len) };

    match source.fill_bytes(dest) {
        Ok(()) => RANDOMBYTES_OK,
        Err(err) => {
            log::warn!("randombytes failed: {err}");
            RANDOMBYTES_ERR
        }
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Core cryptographic traits
//!
//! [`Hash`] and [`StreamCipher`] describe the software primitives;
//! [`CryptoEngine`] is the seam where a hardware accelerator replaces them.

use crate::cipher::{Aes256Key, CtrIv};
use crate::error::CryptoResult;
use q_common::constants::SHA256_OUTPUT_SIZE;

/// Hash function trait
///
/// Provides both one-shot and incremental hashing.
pub trait Hash: Sized {
    /// Output size in bytes
    const OUTPUT_SIZE: usize;
    /// Block size in bytes
    const BLOCK_SIZE: usize;

    /// Output type
    type Output: AsRef<[u8]> + Clone;

    /// Hash a message in one shot
    fn hash(message: &[u8]) -> Self::Output;

    /// Create a new incremental hasher
    fn new() -> Self;

    /// Update the hasher with data
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the hash
    fn finalize(self) -> Self::Output;

    /// Reset the hasher for reuse
    fn reset(&mut self);
}

/// Symmetric stream cipher (keystream XOR)
///
/// Encryption and decryption are the same operation.
pub trait StreamCipher {
    /// Key size in bytes
    const KEY_SIZE: usize;
    /// IV size in bytes
    const IV_SIZE: usize;

    /// XOR the keystream for `(key, iv)` into `data` in place
    fn apply_keystream(key: &[u8], iv: &[u8], data: &mut [u8]) -> CryptoResult<()>;
}

/// Crypto backend used by [`CryptoService`](crate::CryptoService)
///
/// Implemented by [`SoftwareEngine`](crate::SoftwareEngine) and by board
/// accelerator drivers. Methods take `&mut self` since an accelerator is
/// a single stateful peripheral.
pub trait CryptoEngine {
    /// SHA-256 of `data`
    fn sha256(&mut self, data: &[u8]) -> CryptoResult<[u8; SHA256_OUTPUT_SIZE]>;

    /// AES-256-CTR over `data` in place (encrypts and decrypts)
    fn aes256_ctr(&mut self, key: &Aes256Key, iv: &CtrIv, data: &mut [u8]) -> CryptoResult<()>;
}

/// Constant-time comparison
///
/// Compares two byte slices in constant time to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Software crypto engine

use crate::cipher::{Aes256Ctr, Aes256Key, CtrIv};
use crate::error::CryptoResult;
use crate::hash::Sha256;
use crate::traits::{CryptoEngine, Hash};
use q_common::constants::SHA256_OUTPUT_SIZE;

/// [`CryptoEngine`] backed by the RustCrypto implementations
///
/// Counts the operations it performs, which lets integration code check
/// whether a path hashed or encrypted at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareEngine {
    hash_ops: u32,
    cipher_ops: u32,
}

impl SoftwareEngine {
    /// Create a new engine
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hash_ops: 0,
            cipher_ops: 0,
        }
    }

    /// SHA-256 computations performed
    #[must_use]
    pub const fn hash_ops(&self) -> u32 {
        self.hash_ops
    }

    /// AES-CTR transforms performed
    #[must_use]
    pub const fn cipher_ops(&self) -> u32 {
        self.cipher_ops
    }
}

impl CryptoEngine for SoftwareEngine {
    fn sha256(&mut self, data: &[u8]) -> CryptoResult<[u8; SHA256_OUTPUT_SIZE]> {
        self.hash_ops = self.hash_ops.wrapping_add(1);
        Ok(Sha256::hash(data).into_bytes())
    }

    fn aes256_ctr(&mut self, key: &Aes256Key, iv: &CtrIv, data: &mut [u8]) -> CryptoResult<()> {
        self.cipher_ops = self.cipher_ops.wrapping_add(1);
        Aes256Ctr::apply(key, iv, data)
    }
}

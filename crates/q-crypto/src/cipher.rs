// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AES-256-CTR for record encryption
//!
//! Uses the RustCrypto `aes` block cipher in `ctr` mode with a 128-bit
//! big-endian counter: the whole 16-byte IV is the initial counter block.
//!
//! **CRITICAL**: CTR mode leaks the XOR of two plaintexts encrypted under
//! the same key and IV. Every IV handed to this module must be unique for
//! the lifetime of the key.

use crate::error::{CryptoError, CryptoResult};
use crate::traits::StreamCipher;
use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher as _};
use q_common::constants::{AES256_KEY_SIZE, AES_CTR_IV_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes256CtrImpl = ctr::Ctr128BE<Aes256>;

/// AES-256 key (32 bytes), zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes256Key([u8; AES256_KEY_SIZE]);

impl Aes256Key {
    /// Create a new key from bytes
    #[must_use]
    pub const fn new(bytes: [u8; AES256_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from slice
    ///
    /// Returns `None` if slice length is not exactly 32 bytes.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; AES256_KEY_SIZE] = slice.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl AsRef<[u8]> for Aes256Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// CTR initial counter block (16 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CtrIv([u8; AES_CTR_IV_SIZE]);

impl CtrIv {
    /// Create from bytes
    #[must_use]
    pub const fn new(bytes: [u8; AES_CTR_IV_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw counter block
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; AES_CTR_IV_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for CtrIv {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// AES-256 in CTR mode
pub struct Aes256Ctr;

impl Aes256Ctr {
    /// Apply the keystream with typed key and IV
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::BufferTooSmall`] if `data` would exhaust the
    /// counter space.
    pub fn apply(key: &Aes256Key, iv: &CtrIv, data: &mut [u8]) -> CryptoResult<()> {
        <Self as StreamCipher>::apply_keystream(&key.0, &iv.0, data)
    }
}

impl StreamCipher for Aes256Ctr {
    const KEY_SIZE: usize = AES256_KEY_SIZE;
    const IV_SIZE: usize = AES_CTR_IV_SIZE;

    fn apply_keystream(key: &[u8], iv: &[u8], data: &mut [u8]) -> CryptoResult<()> {
        if key.len() != Self::KEY_SIZE {
            return Err(CryptoError::InvalidKey);
        }
        if iv.len() != Self::IV_SIZE {
            return Err(CryptoError::InvalidIv);
        }
        let mut cipher =
            Aes256CtrImpl::new_from_slices(key, iv).map_err(|_| CryptoError::InvalidKey)?;
        cipher
            .try_apply_keystream(data)
            .map_err(|_| CryptoError::BufferTooSmall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystream_is_involution() {
        let key = Aes256Key::new([7u8; 32]);
        let iv = CtrIv::new([1u8; 16]);
        let mut data = *b"record payload bytes, longer than one block";
        let original = data;

        Aes256Ctr::apply(&key, &iv, &mut data).unwrap();
        assert_ne!(data, original);
        Aes256Ctr::apply(&key, &iv, &mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn test_different_iv_different_ciphertext() {
        let key = Aes256Key::new([7u8; 32]);
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        Aes256Ctr::apply(&key, &CtrIv::new([0u8; 16]), &mut a).unwrap();
        let mut iv = [0u8; 16];
        iv[15] = 1;
        Aes256Ctr::apply(&key, &CtrIv::new(iv), &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let mut data = [0u8; 4];
        assert_eq!(
            Aes256Ctr::apply_keystream(&[0u8; 16], &[0u8; 16], &mut data),
            Err(CryptoError::InvalidKey)
        );
        assert_eq!(
            Aes256Ctr::apply_keystream(&[0u8; 32], &[0u8; 12], &mut data),
            Err(CryptoError::InvalidIv)
        );
        assert!(Aes256Key::from_slice(&[0u8; 31]).is_none());
    }
}

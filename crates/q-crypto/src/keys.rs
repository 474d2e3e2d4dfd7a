// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Record-log key material

use crate::cipher::Aes256Key;
use q_common::constants::{AES256_KEY_SIZE, LOG_NONCE_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key and IV nonce of an encrypted record log
///
/// Provisioned by secure boot and handed to the log at init time; never
/// written to flash by the log itself.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct LogKeys {
    key: Aes256Key,
    nonce: [u8; LOG_NONCE_SIZE],
}

impl LogKeys {
    /// Create from raw key and nonce bytes
    #[must_use]
    pub const fn new(key: [u8; AES256_KEY_SIZE], nonce: [u8; LOG_NONCE_SIZE]) -> Self {
        Self {
            key: Aes256Key::new(key),
            nonce,
        }
    }

    /// Encryption key
    #[must_use]
    pub const fn key(&self) -> &Aes256Key {
        &self.key
    }

    /// Leading IV bytes shared by every record of the log
    #[must_use]
    pub const fn nonce(&self) -> &[u8; LOG_NONCE_SIZE] {
        &self.nonce
    }
}

impl core::fmt::Debug for LogKeys {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("LogKeys(..)")
    }
}

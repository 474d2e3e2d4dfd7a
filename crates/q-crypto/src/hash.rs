// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! SHA-256 over the `sha2` crate

use crate::traits::Hash;
use q_common::constants::SHA256_OUTPUT_SIZE;
use sha2::{Digest, Sha256 as Sha256Impl};

/// SHA-256 hash output
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sha256Output([u8; SHA256_OUTPUT_SIZE]);

impl Sha256Output {
    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SHA256_OUTPUT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    #[must_use]
    pub const fn into_bytes(self) -> [u8; SHA256_OUTPUT_SIZE] {
        self.0
    }
}

impl AsRef<[u8]> for Sha256Output {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// SHA-256 hasher
#[derive(Clone)]
pub struct Sha256 {
    inner: Sha256Impl,
}

impl Hash for Sha256 {
    const OUTPUT_SIZE: usize = SHA256_OUTPUT_SIZE;
    const BLOCK_SIZE: usize = 64;

    type Output = Sha256Output;

    fn hash(message: &[u8]) -> Self::Output {
        let result = Sha256Impl::digest(message);
        let mut output = [0u8; SHA256_OUTPUT_SIZE];
        output.copy_from_slice(&result);
        Sha256Output(output)
    }

    fn new() -> Self {
        Self {
            inner: Sha256Impl::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize(self) -> Self::Output {
        let result = self.inner.finalize();
        let mut output = [0u8; SHA256_OUTPUT_SIZE];
        output.copy_from_slice(&result);
        Sha256Output(output)
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut h = Sha256::new();
        h.update(b"flash ");
        h.update(b"recorder");
        assert_eq!(h.finalize(), Sha256::hash(b"flash recorder"));
    }

    #[test]
    fn test_reset_discards_state() {
        let mut h = Sha256::new();
        h.update(b"garbage");
        h.reset();
        h.update(b"abc");
        assert_eq!(h.finalize(), Sha256::hash(b"abc"));
    }
}

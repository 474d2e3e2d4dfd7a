// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Shared crypto service
//!
//! The accelerator is one peripheral used by every log for both hashing
//! and encryption. [`CryptoService`] owns the engine behind a
//! [`TimedMutex`] and holds the lock for exactly one primitive per call.

use crate::cipher::{Aes256Key, CtrIv};
use crate::traits::CryptoEngine;
use q_common::constants::SHA256_OUTPUT_SIZE;
use q_common::{Result, TimedMutex, Timeout};

/// Crypto engine under a bounded-wait lock
pub struct CryptoService<E> {
    engine: TimedMutex<E>,
}

impl<E: CryptoEngine> CryptoService<E> {
    /// Wrap an engine
    #[must_use]
    pub const fn new(engine: E) -> Self {
        Self {
            engine: TimedMutex::new(engine),
        }
    }

    /// SHA-256 of `data`
    ///
    /// # Errors
    ///
    /// [`Busy`](q_common::Error::Busy) if the engine stays locked past
    /// `timeout`; engine failures are converted from
    /// [`CryptoError`](crate::CryptoError).
    pub fn hash(&self, data: &[u8], timeout: Timeout) -> Result<[u8; SHA256_OUTPUT_SIZE]> {
        let mut engine = self.engine.lock(timeout)?;
        Ok(engine.sha256(data)?)
    }

    /// AES-256-CTR over `data` in place; the same call decrypts
    ///
    /// # Errors
    ///
    /// As for [`CryptoService::hash`].
    pub fn aes_ctr(&self, key: &Aes256Key, iv: &CtrIv, data: &mut [u8], timeout: Timeout) -> Result<()> {
        let mut engine = self.engine.lock(timeout)?;
        Ok(engine.aes256_ctr(key, iv, data)?)
    }

    /// Run `f` with exclusive access to the engine
    ///
    /// # Errors
    ///
    /// [`Busy`](q_common::Error::Busy) on lock timeout.
    pub fn with_engine<R>(&self, timeout: Timeout, f: impl FnOnce(&mut E) -> R) -> Result<R> {
        let mut engine = self.engine.lock(timeout)?;
        Ok(f(&mut engine))
    }

    /// Consume the service and return the engine
    pub fn into_inner(self) -> E {
        self.engine.into_inner()
    }
}

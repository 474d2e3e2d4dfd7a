// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Bounded-wait locking
//!
//! [`TimedMutex`] is the lock behind every shared peripheral (the flash
//! device, the crypto accelerator). Acquisition polls for at most the
//! caller's [`Timeout`] and reports [`Error::Busy`] otherwise, so no task
//! blocks on a peripheral indefinitely unless it asks to.

use crate::errors::{Error, Result};
use crate::time::Timeout;
use spin::{Mutex, MutexGuard};

/// Spin mutex with timeout-bounded acquisition
pub struct TimedMutex<T> {
    inner: Mutex<T>,
}

impl<T> TimedMutex<T> {
    /// Create a new unlocked mutex
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Acquire the lock, polling for at most `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if the lock is still held when the wait
    /// budget runs out.
    pub fn lock(&self, timeout: Timeout) -> Result<MutexGuard<'_, T>> {
        match timeout.retries() {
            None => Ok(self.inner.lock()),
            Some(retries) => {
                let mut remaining = retries;
                loop {
                    if let Some(guard) = self.inner.try_lock() {
                        return Ok(guard);
                    }
                    if remaining == 0 {
                        return Err(Error::Busy);
                    }
                    remaining -= 1;
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// Single acquisition attempt
    #[must_use]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Check whether the lock is currently held
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Consume the mutex and return the protected value
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_when_free() {
        let m = TimedMutex::new(5u32);
        let guard = m.lock(Timeout::NoWait).unwrap();
        assert_eq!(*guard, 5);
    }

    #[test]
    fn test_lock_times_out_when_held() {
        let m = TimedMutex::new(0u32);
        let _held = m.lock(Timeout::NoWait).unwrap();
        assert_eq!(m.lock(Timeout::NoWait).err(), Some(Error::Busy));
        assert_eq!(m.lock(Timeout::Spins(50)).err(), Some(Error::Busy));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let m = TimedMutex::new(1u32);
        {
            let mut g = m.lock(Timeout::NoWait).unwrap();
            *g += 1;
        }
        assert!(!m.is_locked());
        assert_eq!(m.into_inner(), 2);
    }
}

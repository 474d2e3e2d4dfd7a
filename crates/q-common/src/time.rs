// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Time utilities for Qbitel EdgeOS
//!
//! Wall-clock stamps as produced by the real-time clock service, the
//! [`TimeSource`] boundary to that service, and the [`Timeout`] used for
//! every bounded wait on a shared resource.

use core::fmt;

/// Wall-clock timestamp with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub seconds: u64,
    /// Milliseconds within the second (0..1000)
    pub milliseconds: u16,
}

impl Timestamp {
    /// Encoded size in bytes
    pub const ENCODED_SIZE: usize = 10;

    /// Create a new timestamp, folding excess milliseconds into seconds
    #[must_use]
    pub const fn new(seconds: u64, milliseconds: u16) -> Self {
        Self {
            seconds: seconds.saturating_add((milliseconds / 1000) as u64),
            milliseconds: milliseconds % 1000,
        }
    }

    /// Create a timestamp from whole seconds
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds, milliseconds: 0 }
    }

    /// Total milliseconds since the epoch (saturating)
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.seconds
            .saturating_mul(1000)
            .saturating_add(self.milliseconds as u64)
    }

    /// Encode as `seconds (u64 LE) || milliseconds (u16 LE)`
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; Self::ENCODED_SIZE] {
        let mut out = [0u8; Self::ENCODED_SIZE];
        out[..8].copy_from_slice(&self.seconds.to_le_bytes());
        out[8..].copy_from_slice(&self.milliseconds.to_le_bytes());
        out
    }

    /// Decode from the layout produced by [`Timestamp::to_le_bytes`]
    ///
    /// Milliseconds are taken verbatim so a decoded stamp re-encodes to
    /// the same bytes.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8; Self::ENCODED_SIZE]) -> Self {
        let mut secs = [0u8; 8];
        secs.copy_from_slice(&bytes[..8]);
        Self {
            seconds: u64::from_le_bytes(secs),
            milliseconds: u16::from_le_bytes([bytes[8], bytes[9]]),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.seconds, self.milliseconds)
    }
}

/// Source of wall-clock time (RTC service boundary)
pub trait TimeSource {
    /// Current time
    fn now(&self) -> Timestamp;
}

/// Fixed clock, always returns the same instant
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTime(pub Timestamp);

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Bounded wait for a shared resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeout {
    /// Single attempt
    NoWait,
    /// Retry up to this many polls before giving up
    Spins(u32),
    /// Wait until the resource is free
    Forever,
}

impl Timeout {
    /// Default bounded wait for flash and crypto locks
    pub const DEFAULT: Self = Self::Spins(100_000);

    /// Number of additional polls after the first attempt, `None` if unbounded
    #[must_use]
    pub const fn retries(&self) -> Option<u32> {
        match self {
            Self::NoWait => Some(0),
            Self::Spins(n) => Some(*n),
            Self::Forever => None,
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_normalizes_millis() {
        let ts = Timestamp::new(10, 2500);
        assert_eq!(ts.seconds, 12);
        assert_eq!(ts.milliseconds, 500);
        assert_eq!(ts.as_millis(), 12_500);
    }

    #[test]
    fn test_timestamp_encoding_layout() {
        let ts = Timestamp::new(0x0102_0304_0506_0708, 999);
        let bytes = ts.to_le_bytes();
        assert_eq!(bytes[0], 0x08);
        assert_eq!(bytes[7], 0x01);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 999);
        assert_eq!(Timestamp::from_le_bytes(&bytes), ts);
    }

    #[test]
    fn test_timestamp_ordering() {
        assert!(Timestamp::new(1, 999) < Timestamp::new(2, 0));
        assert!(Timestamp::new(2, 1) > Timestamp::new(2, 0));
    }

    #[test]
    fn test_timeout_retries() {
        assert_eq!(Timeout::NoWait.retries(), Some(0));
        assert_eq!(Timeout::Spins(7).retries(), Some(7));
        assert_eq!(Timeout::Forever.retries(), None);
    }
}

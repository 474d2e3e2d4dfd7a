// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Cache model that records maintenance operations

use crate::traits::DataCache;

/// Data cache stand-in that remembers what was invalidated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingCache {
    invalidations: u32,
    bytes: u64,
    last: Option<(u32, usize)>,
}

impl RecordingCache {
    /// Create a cache with no recorded operations
    #[must_use]
    pub const fn new() -> Self {
        Self {
            invalidations: 0,
            bytes: 0,
            last: None,
        }
    }

    /// Number of invalidate calls
    #[must_use]
    pub const fn invalidations(&self) -> u32 {
        self.invalidations
    }

    /// Sum of invalidated lengths
    #[must_use]
    pub const fn invalidated_bytes(&self) -> u64 {
        self.bytes
    }

    /// Most recent `(address, len)` invalidated
    #[must_use]
    pub const fn last_range(&self) -> Option<(u32, usize)> {
        self.last
    }
}

impl DataCache for RecordingCache {
    fn invalidate(&mut self, address: u32, len: usize) {
        self.invalidations += 1;
        self.bytes += len as u64;
        self.last = Some((address, len));
    }
}

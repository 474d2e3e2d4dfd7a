// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Recorder status snapshot

use crate::address::FlashAddress;
use core::fmt;

/// Position and occupancy of a log, as returned by
/// [`FlashRecorder::get_status`](crate::FlashRecorder::get_status)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderStatus {
    /// Newest id, `0` when empty
    pub last_id: u32,
    /// Oldest retrievable id, `0` when empty
    pub first_id: u32,
    /// First byte after the newest record
    pub write_cursor: FlashAddress,
    /// Area start
    pub area_begin: FlashAddress,
    /// Area length in bytes
    pub area_len: u32,
    /// Erase page size
    pub page_size: u32,
    /// Slot size
    pub record_size: u32,
    /// Current generation
    pub rotation_count: u32,
    /// Retained records, `first_id` through `last_id` inclusive
    ///
    /// This is a record count, `last_id - first_id + 1` in id distance
    /// across the sentinel, not the bare difference `last_id - first_id`;
    /// `0` for an empty log.
    pub count: u32,
}

impl RecorderStatus {
    /// Check whether the log holds no record
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for RecorderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ids {}..={} ({} records), cursor {} in {}+{:#X}, rotation {}",
            self.first_id, self.last_id, self.count, self.write_cursor, self.area_begin, self.area_len, self.rotation_count
        )
    }
}

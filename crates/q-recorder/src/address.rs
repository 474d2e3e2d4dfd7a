// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Flash addressing and log-area geometry
//!
//! A log area is a run of pages; each page holds `page_size / record_size`
//! slots and leaves the remainder unused. Slots are numbered from 0 at the
//! area start, so slot `n` lives at
//! `begin + (n / per_page) * page_size + (n % per_page) * record_size`.

use core::fmt;
use q_common::{Error, RecorderConfig, Result};

/// Device-relative flash byte address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FlashAddress(u32);

impl FlashAddress {
    /// Wrap a raw device offset
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw device offset
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `self + len`, `None` on overflow
    #[must_use]
    pub const fn checked_add(self, len: u32) -> Option<Self> {
        match self.0.checked_add(len) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// `self - len`, `None` on underflow
    #[must_use]
    pub const fn checked_sub(self, len: u32) -> Option<Self> {
        match self.0.checked_sub(len) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Check alignment to `align` bytes (`align > 0`)
    #[must_use]
    pub const fn is_aligned(self, align: u32) -> bool {
        align != 0 && self.0 % align == 0
    }
}

impl From<FlashAddress> for u32 {
    fn from(value: FlashAddress) -> Self {
        value.0
    }
}

impl fmt::Display for FlashAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Validated geometry of one log area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRegion {
    begin: u32,
    len: u32,
    page_size: u32,
    record_size: u32,
    per_page: u32,
    pages: u32,
}

impl LogRegion {
    /// Build the geometry of a configured log
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn from_config(config: &RecorderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            begin: config.area_begin,
            len: config.area_len,
            page_size: config.page_size,
            record_size: config.record_size,
            per_page: config.records_per_page(),
            pages: config.page_count(),
        })
    }

    /// First byte of the area
    #[must_use]
    pub const fn begin(&self) -> FlashAddress {
        FlashAddress(self.begin)
    }

    /// First byte past the area
    #[must_use]
    pub const fn end(&self) -> FlashAddress {
        // validate() rules out overflow
        FlashAddress(self.begin + self.len)
    }

    /// Area length in bytes
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Page (erase unit) size
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Slot size
    #[must_use]
    pub const fn record_size(&self) -> u32 {
        self.record_size
    }

    /// Slots per page
    #[must_use]
    pub const fn records_per_page(&self) -> u32 {
        self.per_page
    }

    /// Pages in the area
    #[must_use]
    pub const fn page_count(&self) -> u32 {
        self.pages
    }

    /// Total slots in the area
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.per_page * self.pages
    }

    /// Check `addr` lies in `[begin, end)`
    #[must_use]
    pub const fn contains(&self, addr: FlashAddress) -> bool {
        addr.0 >= self.begin && addr.0 - self.begin < self.len
    }

    /// Validate a raw offset as an address inside the area
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] outside `[begin, end)`.
    pub fn address(&self, raw: u32) -> Result<FlashAddress> {
        let addr = FlashAddress(raw);
        if self.contains(addr) {
            Ok(addr)
        } else {
            Err(Error::OutOfRange)
        }
    }

    /// Address of slot `slot`, `None` past the last slot
    #[must_use]
    pub const fn slot_address(&self, slot: u32) -> Option<FlashAddress> {
        if slot >= self.capacity() {
            return None;
        }
        let page = slot / self.per_page;
        let index = slot % self.per_page;
        Some(FlashAddress(
            self.begin + page * self.page_size + index * self.record_size,
        ))
    }

    /// Slot number of a slot-aligned address inside the area
    #[must_use]
    pub const fn slot_of(&self, addr: FlashAddress) -> Option<u32> {
        if !self.contains(addr) {
            return None;
        }
        let offset = addr.0 - self.begin;
        let in_page = offset % self.page_size;
        if in_page % self.record_size != 0 || in_page / self.record_size >= self.per_page {
            return None;
        }
        Some((offset / self.page_size) * self.per_page + in_page / self.record_size)
    }

    /// Number of slots lying before a write cursor in `[begin, end]`
    ///
    /// Unused space at the end of a page counts for nothing, so a cursor
    /// parked in that space and one at the next page start give the same
    /// answer.
    #[must_use]
    pub const fn slots_before(&self, cursor: FlashAddress) -> u32 {
        if cursor.0 <= self.begin {
            return 0;
        }
        let offset = cursor.0 - self.begin;
        if offset >= self.len {
            return self.capacity();
        }
        let in_page = offset % self.page_size;
        let used = in_page / self.record_size;
        let used = if used > self.per_page { self.per_page } else { used };
        (offset / self.page_size) * self.per_page + used
    }

    /// Start of the page containing `addr`
    #[must_use]
    pub const fn page_start(&self, addr: FlashAddress) -> FlashAddress {
        let offset = addr.0.saturating_sub(self.begin);
        FlashAddress(self.begin + offset - offset % self.page_size)
    }
}

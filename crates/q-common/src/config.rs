// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Flash layout and record-log configuration
//!
//! All configuration is compile-time or provisioned at factory. A log's
//! geometry is fixed for the device lifetime; changing it on a populated
//! area requires a format.

use crate::constants::{
    INFO_AREA_SECTORS, INFO_RECORD_SIZE, MAX_RECORD_SIZE, OCTAL_FLASH_SECTOR_SIZE,
    RECORD_HEADER_SIZE,
};
use crate::errors::{Error, Result};
use crate::time::Timeout;

/// Geometry and behaviour of one circular record log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderConfig {
    /// First byte of the log area (device-relative, sector aligned)
    pub area_begin: u32,
    /// Length of the log area in bytes (multiple of `page_size`)
    pub area_len: u32,
    /// Log page size; records never straddle a page (erase sector size)
    pub page_size: u32,
    /// Fixed slot size of every record, header included
    pub record_size: u32,
    /// Encrypt whole records with AES-256-CTR
    pub encrypted: bool,
    /// Wait budget for the flash and crypto locks
    pub timeout: Timeout,
}

impl RecorderConfig {
    /// Create a plaintext log configuration with the default lock timeout
    #[must_use]
    pub const fn new(area_begin: u32, area_len: u32, record_size: u32) -> Self {
        Self {
            area_begin,
            area_len,
            page_size: OCTAL_FLASH_SECTOR_SIZE as u32,
            record_size,
            encrypted: false,
            timeout: Timeout::DEFAULT,
        }
    }

    /// Same configuration with encryption enabled
    #[must_use]
    pub const fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Same configuration with a different lock timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Datalogger log in `layout` with the given slot size
    #[must_use]
    pub const fn datalogger(layout: &FlashLayout, record_size: u32) -> Self {
        Self::new(layout.datalogger_begin, layout.datalogger_len, record_size)
    }

    /// Rotation (info) log of `layout`; always plaintext
    #[must_use]
    pub const fn info_log(layout: &FlashLayout) -> Self {
        Self::new(layout.info_begin, layout.info_len, INFO_RECORD_SIZE as u32)
    }

    /// Whole records that fit in one page
    #[must_use]
    pub const fn records_per_page(&self) -> u32 {
        if self.record_size == 0 {
            0
        } else {
            self.page_size / self.record_size
        }
    }

    /// Number of pages in the area
    #[must_use]
    pub const fn page_count(&self) -> u32 {
        if self.page_size == 0 {
            0
        } else {
            self.area_len / self.page_size
        }
    }

    /// Total record slots in the area
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.records_per_page() * self.page_count()
    }

    /// Payload bytes available in each slot
    #[must_use]
    pub const fn payload_size(&self) -> usize {
        (self.record_size as usize).saturating_sub(RECORD_HEADER_SIZE)
    }

    /// End of the area (exclusive), `None` on 32-bit overflow
    #[must_use]
    pub const fn area_end(&self) -> Option<u32> {
        self.area_begin.checked_add(self.area_len)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the area is empty, not
    /// page-aligned, overflows the 32-bit address space, or when the slot
    /// size is odd, smaller than a header, larger than a page or larger
    /// than [`MAX_RECORD_SIZE`].
    pub const fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.area_len == 0 {
            return Err(Error::InvalidConfig);
        }
        if self.area_begin % self.page_size != 0 || self.area_len % self.page_size != 0 {
            return Err(Error::InvalidConfig);
        }
        if self.area_end().is_none() {
            return Err(Error::InvalidConfig);
        }
        let rs = self.record_size as usize;
        if rs % 2 != 0 || rs < RECORD_HEADER_SIZE || rs > MAX_RECORD_SIZE {
            return Err(Error::InvalidConfig);
        }
        if self.record_size > self.page_size {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

/// Placement of the persistent areas in the serial flash
///
/// The datalogger area sits at the flash origin, followed directly by the
/// two-sector rotation log and then the configuration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashLayout {
    /// Datalogger area start
    pub datalogger_begin: u32,
    /// Datalogger area length
    pub datalogger_len: u32,
    /// Rotation log area start
    pub info_begin: u32,
    /// Rotation log area length
    pub info_len: u32,
    /// Configuration store start
    pub config_begin: u32,
    /// Configuration store length
    pub config_len: u32,
}

impl FlashLayout {
    /// Reference board layout: origin 0x2000, 32 datalogger sectors, 6 config sectors
    pub const DEFAULT: Self = Self::new(0x2000, 32, 6);

    /// Build a layout from the flash origin and sector counts
    #[must_use]
    pub const fn new(origin: u32, datalogger_sectors: u32, config_sectors: u32) -> Self {
        let sector = OCTAL_FLASH_SECTOR_SIZE as u32;
        let datalogger_len = sector * datalogger_sectors;
        let info_begin = origin + datalogger_len;
        let info_len = sector * INFO_AREA_SECTORS;
        Self {
            datalogger_begin: origin,
            datalogger_len,
            info_begin,
            info_len,
            config_begin: info_begin + info_len,
            config_len: sector * config_sectors,
        }
    }

    /// First byte past the last area
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.config_begin + self.config_len
    }
}

impl Default for FlashLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_contiguous() {
        let l = FlashLayout::DEFAULT;
        assert_eq!(l.datalogger_begin, 0x2000);
        assert_eq!(l.info_begin, 0x2000 + 32 * 4096);
        assert_eq!(l.info_len, 2 * 4096);
        assert_eq!(l.config_begin, l.info_begin + l.info_len);
        assert_eq!(l.end(), l.config_begin + 6 * 4096);
    }

    #[test]
    fn test_capacity_accounts_for_page_slack() {
        let cfg = RecorderConfig::new(0, 4 * 4096, 64);
        assert_eq!(cfg.records_per_page(), 64);
        assert_eq!(cfg.capacity(), 256);

        let info = RecorderConfig::info_log(&FlashLayout::DEFAULT);
        assert_eq!(info.records_per_page(), 4096 / 52);
        assert_eq!(info.capacity(), 2 * (4096 / 52));
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert_eq!(RecorderConfig::new(0, 0, 64).validate(), Err(Error::InvalidConfig));
        assert_eq!(RecorderConfig::new(100, 4096, 64).validate(), Err(Error::InvalidConfig));
        assert_eq!(RecorderConfig::new(0, 5000, 64).validate(), Err(Error::InvalidConfig));
        assert_eq!(RecorderConfig::new(0, 4096, 63).validate(), Err(Error::InvalidConfig));
        assert_eq!(RecorderConfig::new(0, 4096, 16).validate(), Err(Error::InvalidConfig));
        assert_eq!(RecorderConfig::new(0, 4096, 2048).validate(), Err(Error::InvalidConfig));
        assert_eq!(
            RecorderConfig::new(0xFFFF_F000, 0x2000, 64).validate(),
            Err(Error::InvalidConfig)
        );
        assert!(RecorderConfig::new(0x1000, 4096, 64).validate().is_ok());
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL traits for the serial flash and its cache
//!
//! Addresses given to [`FlashMedia`] are device-relative byte offsets.
//! Addresses given to [`DataCache`] are CPU (memory-mapped) addresses.

use crate::error::{HalError, HalResult};

/// Raw NOR flash primitives
///
/// Erase sets a whole sector to `0xFF`. Programming can only clear bits,
/// so a location must be erased before it is written again.
pub trait FlashMedia {
    /// Erase granularity in bytes
    const SECTOR_SIZE: usize;

    /// Maximum bytes per program command; a program must not cross a page
    const PAGE_SIZE: usize;

    /// Total device size in bytes
    const TOTAL_SIZE: usize;

    /// Read data from flash
    ///
    /// # Arguments
    /// * `address` - Device-relative byte offset
    /// * `buffer` - Buffer to read into
    fn read(&self, address: u32, buffer: &mut [u8]) -> HalResult<()>;

    /// Program data into one flash page
    ///
    /// # Arguments
    /// * `address` - Device-relative byte offset
    /// * `data` - Bytes to program, must end within the page of `address`
    fn write_page(&mut self, address: u32, data: &[u8]) -> HalResult<()>;

    /// Erase the sector starting at `address` (sector aligned)
    fn erase_sector(&mut self, address: u32) -> HalResult<()>;

    /// Verify flash contents match expected data
    fn verify(&self, address: u32, expected: &[u8]) -> HalResult<bool> {
        let mut buffer = [0u8; 64];
        let mut offset = 0;

        while offset < expected.len() {
            let chunk_size = (expected.len() - offset).min(buffer.len());
            let at = u32::try_from(offset)
                .ok()
                .and_then(|o| address.checked_add(o))
                .ok_or(HalError::FlashOutOfBounds)?;
            self.read(at, &mut buffer[..chunk_size])?;

            if buffer[..chunk_size] != expected[offset..offset + chunk_size] {
                return Ok(false);
            }
            offset += chunk_size;
        }

        Ok(true)
    }

    /// Check `[address, address + len)` lies on the device
    fn check_bounds(address: u32, len: usize) -> HalResult<()> {
        let end = (address as usize)
            .checked_add(len)
            .ok_or(HalError::FlashOutOfBounds)?;
        if end > Self::TOTAL_SIZE {
            return Err(HalError::FlashOutOfBounds);
        }
        Ok(())
    }
}

/// CPU data cache over the memory-mapped flash window
pub trait DataCache {
    /// Invalidate cached lines covering `[address, address + len)`
    fn invalidate(&mut self, address: u32, len: usize);
}

/// Cache stand-in for uncached mappings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoCache;

impl DataCache for NoCache {
    fn invalidate(&mut self, _address: u32, _len: usize) {}
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Flash dispatcher
//!
//! The single owner of the flash device. Every consumer (record logs, the
//! configuration store) goes through one [`Dispatcher`], which
//!
//! - serializes access with a bounded-wait lock held for one call,
//! - validates addresses against the device window,
//! - splits programs at the device program-page boundary,
//! - invalidates the CPU data cache over every changed range.
//!
//! A multi-step sequence (erase, then write) is several calls, each
//! durable on its own; a reset between them leaves the earlier steps done.

use crate::address::FlashAddress;
use q_common::constants::FLEXSPI1_AMBA_BASE;
use q_common::{Error, Result, TimedMutex, Timeout};
use q_hal::{DataCache, FlashMedia, NoCache};

struct Device<M, C> {
    media: M,
    cache: C,
}

/// Serialized access to one flash device
pub struct Dispatcher<M, C = NoCache> {
    device: TimedMutex<Device<M, C>>,
    mapped_base: u32,
}

impl<M: FlashMedia> Dispatcher<M, NoCache> {
    /// Dispatcher for a device mapped at the FlexSPI1 window without cache
    #[must_use]
    pub const fn uncached(media: M) -> Self {
        Self::new(media, NoCache, FLEXSPI1_AMBA_BASE)
    }
}

impl<M: FlashMedia, C: DataCache> Dispatcher<M, C> {
    /// Take ownership of the device and its cache
    ///
    /// `mapped_base` is the CPU address at which the device is memory
    /// mapped; cache maintenance uses mapped addresses.
    #[must_use]
    pub const fn new(media: M, cache: C, mapped_base: u32) -> Self {
        Self {
            device: TimedMutex::new(Device { media, cache }),
            mapped_base,
        }
    }

    /// CPU address of device offset 0
    #[must_use]
    pub const fn mapped_base(&self) -> u32 {
        self.mapped_base
    }

    /// Convert a memory-mapped CPU address into a device address
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] outside the mapped window.
    pub fn translate(&self, mapped: u32) -> Result<FlashAddress> {
        let offset = mapped.checked_sub(self.mapped_base).ok_or(Error::OutOfRange)?;
        if offset as usize >= M::TOTAL_SIZE {
            return Err(Error::OutOfRange);
        }
        Ok(FlashAddress::new(offset))
    }

    /// Read `dst.len()` bytes starting at `src`
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] outside the device, [`Error::Busy`] on lock
    /// timeout, [`Error::FlashError`] on a failed read.
    pub fn read_memory(&self, src: FlashAddress, dst: &mut [u8], timeout: Timeout) -> Result<()> {
        Self::check_window(src, dst.len())?;
        let device = self.device.lock(timeout)?;
        device.media.read(src.raw(), dst)?;
        Ok(())
    }

    /// Program `src` at `dst`, page by page
    ///
    /// The target range must be erased. Each physical program covers at
    /// most one device page; the cache is invalidated after each one.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for an odd length or odd destination
    /// (the device programs half-words), [`Error::OutOfRange`] outside
    /// the device, [`Error::Busy`] on lock timeout, [`Error::FlashError`]
    /// on a failed program. The lock is released on every path.
    pub fn write_memory(&self, dst: FlashAddress, src: &[u8], timeout: Timeout) -> Result<()> {
        if src.len() % 2 != 0 || !dst.is_aligned(2) {
            return Err(Error::InvalidParameter);
        }
        Self::check_window(dst, src.len())?;

        let mut guard = self.device.lock(timeout)?;
        let device = &mut *guard;
        let mut address = dst.raw();
        for chunk in PageChunks::new(src, address as usize, M::PAGE_SIZE) {
            device.media.write_page(address, chunk)?;
            device
                .cache
                .invalidate(self.mapped_base.wrapping_add(address), chunk.len());
            // check_window bounds the total, so this cannot overflow
            address += chunk.len() as u32;
        }
        Ok(())
    }

    /// Erase `count` sectors starting at the sector-aligned `dst`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for an unaligned start or zero count,
    /// [`Error::OutOfRange`] outside the device, [`Error::Busy`] on lock
    /// timeout, [`Error::FlashError`] on a failed erase.
    pub fn erase_sectors(&self, dst: FlashAddress, count: u32, timeout: Timeout) -> Result<()> {
        let sector = u32::try_from(M::SECTOR_SIZE).map_err(|_| Error::InvalidConfig)?;
        if count == 0 || !dst.is_aligned(sector) {
            return Err(Error::InvalidParameter);
        }
        let span = count.checked_mul(sector).ok_or(Error::OutOfRange)?;
        Self::check_window(dst, span as usize)?;

        let mut guard = self.device.lock(timeout)?;
        let device = &mut *guard;
        for i in 0..count {
            let address = dst.raw() + i * sector;
            device.media.erase_sector(address)?;
            device
                .cache
                .invalidate(self.mapped_base.wrapping_add(address), M::SECTOR_SIZE);
        }
        Ok(())
    }

    /// Run `f` with exclusive access to the raw device
    ///
    /// Meant for diagnostics and production test; bypasses validation and
    /// cache maintenance.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] on lock timeout.
    pub fn with_media<R>(&self, timeout: Timeout, f: impl FnOnce(&mut M) -> R) -> Result<R> {
        let mut device = self.device.lock(timeout)?;
        Ok(f(&mut device.media))
    }

    /// Release the device and cache
    pub fn into_inner(self) -> (M, C) {
        let device = self.device.into_inner();
        (device.media, device.cache)
    }

    fn check_window(address: FlashAddress, len: usize) -> Result<()> {
        let end = (address.raw() as usize)
            .checked_add(len)
            .ok_or(Error::OutOfRange)?;
        if end > M::TOTAL_SIZE {
            return Err(Error::OutOfRange);
        }
        Ok(())
    }
}

/// Splits a buffer so no piece crosses a `page`-byte boundary
struct PageChunks<'a> {
    rest: &'a [u8],
    position: usize,
    page: usize,
}

impl<'a> PageChunks<'a> {
    fn new(data: &'a [u8], position: usize, page: usize) -> Self {
        Self {
            rest: data,
            position,
            page,
        }
    }
}

impl<'a> Iterator for PageChunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() || self.page == 0 {
            return None;
        }
        let room = self.page - self.position % self.page;
        let (chunk, rest) = self.rest.split_at(room.min(self.rest.len()));
        self.rest = rest;
        self.position += chunk.len();
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_chunks_split_at_boundaries() {
        let data = [0u8; 600];
        let sizes: heapless::Vec<usize, 8> =
            PageChunks::new(&data, 200, 256).map(<[u8]>::len).collect();
        assert_eq!(sizes.as_slice(), &[56, 256, 256, 32]);
    }

    #[test]
    fn test_page_chunks_aligned_start() {
        let data = [0u8; 512];
        assert_eq!(PageChunks::new(&data, 0, 256).count(), 2);
        assert_eq!(PageChunks::new(&[], 0, 256).count(), 0);
    }
}

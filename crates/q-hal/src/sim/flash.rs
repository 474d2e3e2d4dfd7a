// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! RAM-backed NOR flash

use crate::error::{HalError, HalResult};
use crate::traits::FlashMedia;
use q_common::constants::{ERASED_BYTE, OCTAL_FLASH_PAGE_SIZE, OCTAL_FLASH_SECTOR_SIZE};

/// Simulated octal NOR flash of `SIZE` bytes
///
/// Starts fully erased. Program operations AND data into the array, so
/// writing over unerased data corrupts it exactly like real NOR.
pub struct RamFlash<const SIZE: usize> {
    data: [u8; SIZE],
    /// Erase/program operations left before injected failures start
    ops_before_fault: Option<u32>,
    /// Failures left once started; `None` fails until cleared
    faults_left: Option<u32>,
    /// A failing program still stores the first half of its data
    torn_writes: bool,
    erase_count: u32,
    program_count: u32,
}

impl<const SIZE: usize> RamFlash<SIZE> {
    /// Create an erased device
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: [ERASED_BYTE; SIZE],
            ops_before_fault: None,
            faults_left: None,
            torn_writes: false,
            erase_count: 0,
            program_count: 0,
        }
    }

    /// Let `ops` more erase/program operations succeed, then fail every one
    pub fn fail_after(&mut self, ops: u32) {
        self.ops_before_fault = Some(ops);
        self.faults_left = None;
    }

    /// Let `ops` more operations succeed, fail the next `count`, then
    /// behave normally again
    pub fn fail_window(&mut self, ops: u32, count: u32) {
        self.ops_before_fault = Some(ops);
        self.faults_left = Some(count);
    }

    /// Make failing programs store half of their data (torn write)
    pub fn set_torn_writes(&mut self, torn: bool) {
        self.torn_writes = torn;
    }

    /// Stop injecting failures
    pub fn clear_faults(&mut self) {
        self.ops_before_fault = None;
        self.faults_left = None;
        self.torn_writes = false;
    }

    /// XOR a stored byte, emulating bit rot or tampering
    ///
    /// Offsets past the end of the device are ignored.
    pub fn corrupt(&mut self, offset: usize, xor: u8) {
        if let Some(b) = self.data.get_mut(offset) {
            *b ^= xor;
        }
    }

    /// Raw device contents
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Sector erases performed so far
    #[must_use]
    pub const fn erase_count(&self) -> u32 {
        self.erase_count
    }

    /// Page programs performed so far
    #[must_use]
    pub const fn program_count(&self) -> u32 {
        self.program_count
    }

    /// Consume one operation from the fault budget; `true` if it must fail
    fn fault_due(&mut self) -> bool {
        let Some(ops) = self.ops_before_fault else {
            return false;
        };
        if ops > 0 {
            self.ops_before_fault = Some(ops - 1);
            return false;
        }
        match self.faults_left {
            None => true,
            Some(0) => {
                self.ops_before_fault = None;
                self.faults_left = None;
                false
            }
            Some(left) => {
                self.faults_left = Some(left - 1);
                true
            }
        }
    }
}

impl<const SIZE: usize> Default for RamFlash<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> FlashMedia for RamFlash<SIZE> {
    const SECTOR_SIZE: usize = OCTAL_FLASH_SECTOR_SIZE;
    const PAGE_SIZE: usize = OCTAL_FLASH_PAGE_SIZE;
    const TOTAL_SIZE: usize = SIZE;

    fn read(&self, address: u32, buffer: &mut [u8]) -> HalResult<()> {
        Self::check_bounds(address, buffer.len())?;
        let start = address as usize;
        buffer.copy_from_slice(&self.data[start..start + buffer.len()]);
        Ok(())
    }

    fn write_page(&mut self, address: u32, data: &[u8]) -> HalResult<()> {
        Self::check_bounds(address, data.len())?;
        let start = address as usize;
        let page_end = (start / Self::PAGE_SIZE + 1) * Self::PAGE_SIZE;
        if data.is_empty() || start + data.len() > page_end {
            return Err(HalError::FlashMisaligned);
        }

        if self.fault_due() {
            if self.torn_writes {
                let half = data.len() / 2;
                for (cell, byte) in self.data[start..start + half].iter_mut().zip(data) {
                    *cell &= *byte;
                }
            }
            return Err(HalError::FlashWriteFailed);
        }

        for (cell, byte) in self.data[start..start + data.len()].iter_mut().zip(data) {
            *cell &= *byte;
        }
        self.program_count += 1;
        Ok(())
    }

    fn erase_sector(&mut self, address: u32) -> HalResult<()> {
        Self::check_bounds(address, Self::SECTOR_SIZE)?;
        let start = address as usize;
        if start % Self::SECTOR_SIZE != 0 {
            return Err(HalError::FlashMisaligned);
        }
        if self.fault_due() {
            return Err(HalError::FlashEraseFailed);
        }
        self.data[start..start + Self::SECTOR_SIZE].fill(ERASED_BYTE);
        self.erase_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Flash = RamFlash<{ 4 * OCTAL_FLASH_SECTOR_SIZE }>;

    #[test]
    fn test_starts_erased() {
        let flash = Flash::new();
        assert!(flash.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut flash = Flash::new();
        flash.write_page(0, &[0xF0, 0x0F]).unwrap();
        flash.write_page(0, &[0x3C, 0xFF]).unwrap();
        let mut out = [0u8; 2];
        flash.read(0, &mut out).unwrap();
        assert_eq!(out, [0x30, 0x0F]);
    }

    #[test]
    fn test_program_cannot_cross_page() {
        let mut flash = Flash::new();
        let data = [0u8; 8];
        assert_eq!(flash.write_page(252, &data), Err(HalError::FlashMisaligned));
        assert!(flash.write_page(248, &data).is_ok());
    }

    #[test]
    fn test_erase_requires_sector_alignment() {
        let mut flash = Flash::new();
        assert_eq!(flash.erase_sector(100), Err(HalError::FlashMisaligned));
        assert_eq!(
            flash.erase_sector(4 * OCTAL_FLASH_SECTOR_SIZE as u32),
            Err(HalError::FlashOutOfBounds)
        );
    }

    #[test]
    fn test_fault_injection_budget() {
        let mut flash = Flash::new();
        flash.fail_after(1);
        assert!(flash.erase_sector(0).is_ok());
        assert_eq!(flash.write_page(0, &[0]), Err(HalError::FlashWriteFailed));
        assert_eq!(flash.erase_sector(0), Err(HalError::FlashEraseFailed));
        flash.clear_faults();
        assert!(flash.write_page(0, &[0]).is_ok());
        assert_eq!(flash.erase_count(), 1);
        assert_eq!(flash.program_count(), 1);
    }

    #[test]
    fn test_fault_window_recovers() {
        let mut flash = Flash::new();
        flash.fail_window(1, 2);
        assert!(flash.erase_sector(0).is_ok());
        assert!(flash.write_page(0, &[0]).is_err());
        assert!(flash.erase_sector(0).is_err());
        assert!(flash.write_page(0, &[0]).is_ok());
        assert!(flash.erase_sector(0).is_ok());
    }

    #[test]
    fn test_torn_write_stores_prefix() {
        let mut flash = Flash::new();
        flash.fail_after(0);
        flash.set_torn_writes(true);
        assert!(flash.write_page(0, &[0, 0, 0, 0]).is_err());
        assert_eq!(&flash.as_bytes()[..4], &[0, 0, 0xFF, 0xFF]);
    }
}

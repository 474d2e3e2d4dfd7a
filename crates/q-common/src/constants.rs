// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! System-wide constants for Qbitel EdgeOS
//!
//! Compile-time sizes and limits for the serial-flash record logs.

// =============================================================================
// Flash Device Constants
// =============================================================================

/// Octal flash erase sector size in bytes
pub const OCTAL_FLASH_SECTOR_SIZE: usize = 4096;

/// Octal flash program page size in bytes (max bytes per program command)
pub const OCTAL_FLASH_PAGE_SIZE: usize = 256;

/// Base of the memory-mapped (AHB/AMBA) window of the FlexSPI1 flash
pub const FLEXSPI1_AMBA_BASE: u32 = 0x3000_0000;

/// Value of every byte of an erased flash cell
pub const ERASED_BYTE: u8 = 0xFF;

// =============================================================================
// Cryptographic Constants
// =============================================================================

/// SHA-256 output size in bytes
pub const SHA256_OUTPUT_SIZE: usize = 32;

/// AES-256 key size in bytes
pub const AES256_KEY_SIZE: usize = 32;

/// AES-CTR initial counter block size in bytes
pub const AES_CTR_IV_SIZE: usize = 16;

/// Per-log nonce size in bytes (leading part of every IV)
pub const LOG_NONCE_SIZE: usize = 8;

// =============================================================================
// Record Log Constants
// =============================================================================

/// Upper bound on a record slot; sizes the on-stack scratch buffers
pub const MAX_RECORD_SIZE: usize = 1024;

/// Record id reserved for the erased state, never assigned
pub const SENTINEL_UUID: u32 = 0xFFFF_FFFF;

/// Record header size: digest (32) + uuid (4) + timestamp (10)
pub const RECORD_HEADER_SIZE: usize = SHA256_OUTPUT_SIZE + 4 + 10;

/// Info-log payload: rotation number (4) + origin (1), padded to even
pub const INFO_PAYLOAD_SIZE: usize = 6;

/// Info-log record slot size
pub const INFO_RECORD_SIZE: usize = RECORD_HEADER_SIZE + INFO_PAYLOAD_SIZE;

/// Number of sectors reserved for the info log
pub const INFO_AREA_SECTORS: u32 = 2;

// Flash programs in half-words; every slot must be even.
const _: () = assert!(RECORD_HEADER_SIZE % 2 == 0);
const _: () = assert!(INFO_RECORD_SIZE % 2 == 0);
const _: () = assert!(OCTAL_FLASH_SECTOR_SIZE % OCTAL_FLASH_PAGE_SIZE == 0);

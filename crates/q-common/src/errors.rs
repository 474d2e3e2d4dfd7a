// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Error types for Qbitel EdgeOS
//!
//! This module defines the unified error type used by the flash recorder
//! stack. All errors are `no_std` compatible and carry no heap data.
//!
//! Lower layers (`q-hal`, `q-crypto`) define their own error enums and
//! convert into [`Error`] at the crate boundary, so a recorder caller only
//! ever sees this type.

use core::fmt;

/// Result type alias for Qbitel EdgeOS operations
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for Qbitel EdgeOS
///
/// This enum represents all possible errors that can occur in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Cryptographic Errors (0x01xx)
    // =========================================================================
    /// Invalid cryptographic key format or size, or key missing
    InvalidKey,
    /// Hash computation failed
    HashError,

    // =========================================================================
    // HAL Errors (0x08xx)
    // =========================================================================
    /// Hardware initialization failed
    HardwareInitFailed,
    /// Flash operation failed
    FlashError,

    // =========================================================================
    // Kernel Errors (0x09xx)
    // =========================================================================
    /// Memory allocation failed (scratch buffer exhausted)
    MemoryAllocationFailed,

    // =========================================================================
    // General Errors (0xFFxx)
    // =========================================================================
    /// Buffer is too small for operation
    BufferTooSmall,
    /// Invalid parameter provided
    InvalidParameter,
    /// Operation timed out
    Timeout,
    /// Resource is busy (lock not acquired within the timeout)
    Busy,
    /// Feature not implemented
    NotImplemented,
    /// Internal error (should not occur)
    InternalError,
    /// Invalid state for the operation
    InvalidState,
    /// Generic cryptographic operation error
    CryptoError,
    /// Integrity check failed (checksum, hash, etc.)
    IntegrityCheckFailed,
    /// Requested item not found
    NotFound,
    /// Address or length outside the permitted range
    OutOfRange,
    /// Configuration rejected during validation
    InvalidConfig,
    /// Component used before initialization
    NotInitialized,
}

impl Error {
    /// Get the error code for this error
    ///
    /// Error codes are organized by category:
    /// - 0x01xx: Cryptographic errors
    /// - 0x08xx: HAL errors
    /// - 0x09xx: Kernel errors
    /// - 0xFFxx: General errors
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            // Crypto errors (0x01xx)
            Self::InvalidKey => 0x0101,
            Self::HashError => 0x0108,

            // HAL errors (0x08xx)
            Self::HardwareInitFailed => 0x0801,
            Self::FlashError => 0x0802,

            // Kernel errors (0x09xx)
            Self::MemoryAllocationFailed => 0x0902,

            // General errors (0xFFxx)
            Self::BufferTooSmall => 0xFF01,
            Self::InvalidParameter => 0xFF02,
            Self::Timeout => 0xFF03,
            Self::Busy => 0xFF04,
            Self::NotImplemented => 0xFF06,
            Self::InternalError => 0xFFFF,
            Self::InvalidState => 0xFF07,
            Self::CryptoError => 0xFF08,
            Self::IntegrityCheckFailed => 0xFF0A,
            Self::NotFound => 0xFF0B,
            Self::OutOfRange => 0xFF0E,
            Self::InvalidConfig => 0xFF0F,
            Self::NotInitialized => 0xFF10,
        }
    }

    /// Check if the caller may simply retry the operation later
    ///
    /// Only transient conditions qualify. Every other error needs a
    /// different input or a recovery step.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::MemoryAllocationFailed | Self::Timeout)
    }

    /// Check if this is a data integrity error
    #[must_use]
    pub const fn is_integrity_error(&self) -> bool {
        matches!(self, Self::IntegrityCheckFailed | Self::HashError)
    }

    /// Get a short description of the error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid cryptographic key",
            Self::HashError => "hash computation failed",
            Self::HardwareInitFailed => "hardware init failed",
            Self::FlashError => "flash error",
            Self::MemoryAllocationFailed => "memory allocation failed",
            Self::BufferTooSmall => "buffer too small",
            Self::InvalidParameter => "invalid parameter",
            Self::Timeout => "timeout",
            Self::Busy => "busy",
            Self::NotImplemented => "not implemented",
            Self::InternalError => "internal error",
            Self::InvalidState => "invalid state",
            Self::CryptoError => "crypto error",
            Self::IntegrityCheckFailed => "integrity check failed",
            Self::NotFound => "not found",
            Self::OutOfRange => "out of range",
            Self::InvalidConfig => "invalid configuration",
            Self::NotInitialized => "not initialized",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

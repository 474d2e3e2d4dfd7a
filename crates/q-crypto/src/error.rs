// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Cryptographic error types

use core::fmt;

/// Error type for cryptographic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key format or size
    InvalidKey,
    /// Invalid IV / counter block
    InvalidIv,
    /// Buffer is too small for the operation
    BufferTooSmall,
    /// Accelerator lock not acquired within the timeout
    Busy,
    /// Accelerator reported a fault
    HardwareFault,
    /// Internal error (should not occur)
    InternalError,
}

impl CryptoError {
    /// Get error code for logging/debugging
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidKey => 0x0101,
            Self::InvalidIv => 0x0109,
            Self::BufferTooSmall => 0x0106,
            Self::Busy => 0x0110,
            Self::HardwareFault => 0x0111,
            Self::InternalError => 0x01FF,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid key",
            Self::InvalidIv => "invalid IV",
            Self::BufferTooSmall => "buffer too small",
            Self::Busy => "crypto engine busy",
            Self::HardwareFault => "crypto hardware fault",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CryptoError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

impl From<CryptoError> for q_common::Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidKey | CryptoError::InvalidIv => Self::InvalidKey,
            CryptoError::BufferTooSmall => Self::BufferTooSmall,
            CryptoError::Busy => Self::Busy,
            CryptoError::HardwareFault => Self::CryptoError,
            CryptoError::InternalError => Self::InternalError,
        }
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

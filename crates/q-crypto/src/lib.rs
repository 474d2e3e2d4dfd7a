// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel EdgeOS Cryptographic Layer for the flash recorder
//!
//! Provides the two primitives the record logs depend on and the shared
//! service that serializes access to them:
//!
//! - **SHA-256**: record integrity digests
//! - **AES-256-CTR**: whole-record encryption with address-derived IVs
//! - [`CryptoService`]: one engine (software or hardware accelerator)
//!   behind a bounded-wait lock, shared by every log
//!
//! # Security Requirements
//!
//! - Key material is zeroized on drop and never logged
//! - Digest comparison is constant time
//! - An IV must never repeat under one key; callers derive it from the
//!   record address and generation

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;
pub mod hash;
pub mod cipher;
pub mod keys;
pub mod engine;
pub mod service;

// Re-export main traits and types
pub use error::{CryptoError, CryptoResult};
pub use traits::{constant_time_eq, CryptoEngine, Hash, StreamCipher};
pub use hash::Sha256;
pub use cipher::{Aes256Ctr, Aes256Key, CtrIv};
pub use keys::LogKeys;
pub use engine::SoftwareEngine;
pub use service::CryptoService;

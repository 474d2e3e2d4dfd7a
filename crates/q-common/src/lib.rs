// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel EdgeOS Common Library
//!
//! This crate provides the error type, configuration structures, logging
//! buffer, time and locking primitives shared by the flash recorder stack
//! (`q-hal`, `q-crypto`, `q-recorder`).
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default for embedded)
//! - `defmt`: Enable defmt logging support for embedded debugging
//!
//! No heap allocations are performed - all buffers use fixed-size arrays or
//! heapless collections.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

pub mod errors;
pub mod config;
pub mod log;
pub mod constants;
pub mod time;
pub mod sync;

// Re-export commonly used items
pub use errors::{Error, Result};
pub use config::{FlashLayout, RecorderConfig};
pub use time::{Timeout, TimeSource, Timestamp};
pub use sync::TimedMutex;

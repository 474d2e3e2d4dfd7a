// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware Abstraction Layer for the flash recorder
//!
//! Platform-agnostic interfaces to the serial (octal) NOR flash and the
//! CPU data cache sitting in front of its memory-mapped window.
//!
//! # Architecture
//!
//! 1. **Traits**: [`FlashMedia`] (raw erase/program/read primitives) and
//!    [`DataCache`] (invalidate after the flash content changes)
//! 2. **Drivers**: board-specific implementations of the traits
//! 3. **Simulation**: the `sim` feature provides a RAM-backed NOR model
//!    with fault injection for host testing
//!
//! Only the dispatcher in `q-recorder` is expected to drive a
//! [`FlashMedia`] directly.

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod traits;
pub mod error;

#[cfg(feature = "sim")]
pub mod sim;

// Re-export main traits
pub use traits::*;
pub use error::{HalError, HalResult};

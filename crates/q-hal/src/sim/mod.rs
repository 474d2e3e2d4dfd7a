// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Host simulation of the flash hardware
//!
//! [`RamFlash`] models an octal NOR device in RAM, including the
//! erase-before-write rule and program page limits, and can be told to
//! fail after a number of operations to emulate a reset mid-sequence.
//! [`RecordingCache`] records invalidations so callers can check cache
//! maintenance.

mod cache;
mod flash;

pub use cache::RecordingCache;
pub use flash::RamFlash;

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Flash-resident circular record log for Qbitel EdgeOS
//!
//! An append-only event/audit log kept in raw serial NOR flash:
//!
//! - Fixed-size records, never straddling an erase page
//! - O(1) lookup of any retained record by its monotonic id
//! - Recovery of the write position after any reset, clean or not
//! - SHA-256 integrity digest on every record
//! - Optional whole-record AES-256-CTR encryption, with IVs made unique
//!   across physical-address reuse by a durable rotation (info) log
//!
//! # Layering
//!
//! ```text
//! FlashRecorder ──► RecordCodec ──► CryptoService
//!       │                 │
//!       ▼                 ▼
//!  RotationLog        Dispatcher ──► FlashMedia
//! ```
//!
//! The [`Dispatcher`] is the only component touching the flash device and
//! serializes every consumer of it. A [`FlashRecorder`] can serve as the
//! rotation log of exactly one other recorder; the type system rules out
//! deeper nesting.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod dispatcher;
pub mod codec;
pub mod info;
pub mod recorder;
pub mod status;

pub use address::{FlashAddress, LogRegion};
pub use codec::{InfoRecord, RecordCodec, RecordHeader, RecordOrigin, SlotContent, StoredRecord};
pub use dispatcher::Dispatcher;
pub use info::{NoInfoLog, RotationLog};
pub use recorder::{
    Crossing, FlashRecorder, RecorderContext, RecorderState, RecoveryReport, RecoveryStop,
};
pub use status::RecorderStatus;

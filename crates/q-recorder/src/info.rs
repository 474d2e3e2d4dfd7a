// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Rotation (info) log wiring
//!
//! A recorder persists each format and wraparound of its area into a
//! [`RotationLog`]. The only real implementation is a plaintext
//! [`FlashRecorder`] that itself has [`NoInfoLog`], so a rotation log can
//! never have a rotation log of its own: nesting is one level deep by
//! construction.

use crate::codec::{InfoRecord, SlotContent};
use crate::recorder::{FlashRecorder, RecorderState};
use q_common::Result;
use q_crypto::CryptoEngine;
use q_hal::{DataCache, FlashMedia};

/// Durable store of rotation numbers
pub trait RotationLog {
    /// `false` only for [`NoInfoLog`]
    const PRESENT: bool;

    /// Make the log usable, recovering it first if needed
    ///
    /// # Errors
    ///
    /// Recovery errors of the underlying log.
    fn prepare(&mut self) -> Result<()>;

    /// Rotation number of the newest entry, `None` if there is none
    ///
    /// # Errors
    ///
    /// Read errors of the underlying log.
    fn latest_rotation(&mut self) -> Result<Option<u32>>;

    /// Append an entry
    ///
    /// # Errors
    ///
    /// Append errors of the underlying log.
    fn record(&mut self, record: InfoRecord) -> Result<()>;

    /// Erase every entry
    ///
    /// # Errors
    ///
    /// Format errors of the underlying log.
    fn reset(&mut self) -> Result<()>;
}

/// Absent rotation log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoInfoLog;

impl RotationLog for NoInfoLog {
    const PRESENT: bool = false;

    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    fn latest_rotation(&mut self) -> Result<Option<u32>> {
        Ok(None)
    }

    fn record(&mut self, _record: InfoRecord) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: RotationLog> RotationLog for &mut T {
    const PRESENT: bool = T::PRESENT;

    fn prepare(&mut self) -> Result<()> {
        (**self).prepare()
    }

    fn latest_rotation(&mut self) -> Result<Option<u32>> {
        (**self).latest_rotation()
    }

    fn record(&mut self, record: InfoRecord) -> Result<()> {
        (**self).record(record)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}

impl<M, C, E> RotationLog for FlashRecorder<'_, M, C, E, NoInfoLog>
where
    M: FlashMedia,
    C: DataCache,
    E: CryptoEngine,
{
    const PRESENT: bool = true;

    fn prepare(&mut self) -> Result<()> {
        if self.state() == RecorderState::Uninitialized {
            self.init()?;
        }
        Ok(())
    }

    fn latest_rotation(&mut self) -> Result<Option<u32>> {
        if self.is_empty() {
            return Ok(None);
        }
        let Some(slot) = self.newest_slot() else {
            return Ok(None);
        };
        match self.read_slot(slot, self.rotation_count())? {
            SlotContent::Record(rec) => Ok(InfoRecord::decode(rec.payload()).map(|i| i.rotation_number)),
            SlotContent::Erased | SlotContent::Corrupted => Ok(None),
        }
    }

    fn record(&mut self, record: InfoRecord) -> Result<()> {
        self.append(&record.encode()).map(|_| ())
    }

    fn reset(&mut self) -> Result<()> {
        self.format()
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Circular record log
//!
//! # Write cursor
//!
//! `write_cursor` is the first byte after the newest record, so it ranges
//! over `[area_begin, area_end]`. `area_begin` means the log is empty; a
//! cursor with no room left in its page makes the next append move to the
//! next page (erasing it first) or wrap to the area start.
//!
//! # Generations
//!
//! Slots `[0, w)` before the cursor were written in the current generation
//! (`rotation_count`). Slots from the first page boundary at or after the
//! cursor to the end of the area, if still populated, were written in the
//! previous generation. Every wrap bumps the generation and records it in
//! the rotation log before any later write can depend on it, which keeps
//! CTR IVs unique across address reuse.
//!
//! # Power loss
//!
//! An append is erase (on page change), then program, then, on wrap, a
//! rotation-log append. A reset between any two steps leaves a state that
//! [`FlashRecorder::init`] recovers:
//!
//! - erased page, no record: the tail is simply shorter
//! - torn record: recovery stops before it; the next append starts on a
//!   fresh page, and the abandoned page tail becomes a skipped span that id
//!   lookups step over
//! - wrapped record without its rotation entry: detected because the record
//!   only verifies under the next generation, which is then persisted

use crate::address::{FlashAddress, LogRegion};
use crate::codec::{next_uuid, uuid_distance, InfoRecord, RecordCodec, RecordOrigin, SlotContent, StoredRecord};
use crate::dispatcher::Dispatcher;
use crate::info::{NoInfoLog, RotationLog};
use crate::status::RecorderStatus;
use q_common::constants::SENTINEL_UUID;
use q_common::log::SYSTEM_LOG;
use q_common::{log_debug, log_info, log_warn};
use q_common::{Error, RecorderConfig, Result, TimeSource, Timestamp};
use q_crypto::{CryptoEngine, CryptoService, LogKeys};
use q_hal::{DataCache, FlashMedia};

const LOG_MODULE: &str = "recorder";

/// Skipped spans tracked per handle; older ones are forgotten first
const MAX_SKIPPED_SPANS: usize = 8;

/// Shared collaborators of every recorder on one device
pub struct RecorderContext<'a, M, C, E> {
    /// Flash access
    pub dispatcher: &'a Dispatcher<M, C>,
    /// Hashing and encryption
    pub crypto: &'a CryptoService<E>,
    /// Wall-clock stamps for new records
    pub clock: &'a dyn TimeSource,
}

impl<M, C, E> Clone for RecorderContext<'_, M, C, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, C, E> Copy for RecorderContext<'_, M, C, E> {}

impl<'a, M, C, E> RecorderContext<'a, M, C, E> {
    /// Bundle the collaborators
    #[must_use]
    pub const fn new(
        dispatcher: &'a Dispatcher<M, C>,
        crypto: &'a CryptoService<E>,
        clock: &'a dyn TimeSource,
    ) -> Self {
        Self {
            dispatcher,
            crypto,
            clock,
        }
    }
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Constructed; `init` or `format` not yet run
    Uninitialized,
    /// Write position known, all operations available
    Ready,
}

/// Where the next record goes relative to the cursor's page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// Same page, already erased
    None,
    /// Start of the following page
    NextPage,
    /// Start of the area; the generation advances
    WrappedArea,
}

/// Why recovery stopped scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStop {
    /// No written slot in the area
    Empty,
    /// Reached an erased slot
    Erased,
    /// Reached the end of the area
    AreaEnd,
    /// Reached a slot failing verification
    Corrupted,
    /// Reached a valid record that does not continue the id sequence
    Discontinuity,
}

/// Outcome of [`FlashRecorder::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Records in the current generation run that was recovered
    pub records: u32,
    /// What ended the scan
    pub stop: RecoveryStop,
    /// Generation in force after recovery
    pub rotation: u32,
    /// A lost rotation entry was detected and rewritten
    pub rotation_resumed: bool,
}

/// Slot position plus the generation it was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    slot: u32,
    generation: u32,
}

/// Slots `[start, end)` of one generation that carry no id: the rest of a
/// page abandoned after a torn or out-of-sequence slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SkippedSpan {
    generation: u32,
    start: u32,
    end: u32,
}

type SpanList = heapless::Vec<SkippedSpan, MAX_SKIPPED_SPANS>;

/// Fixed-slot circular record log on serial flash
///
/// `I` is the rotation log: [`NoInfoLog`], another recorder (by value or
/// `&mut`) whose own `I` is [`NoInfoLog`].
pub struct FlashRecorder<'a, M, C, E, I = NoInfoLog> {
    ctx: RecorderContext<'a, M, C, E>,
    config: RecorderConfig,
    region: LogRegion,
    info: I,
    keys: Option<LogKeys>,
    state: RecorderState,
    write_cursor: FlashAddress,
    last_id: u32,
    rotation_count: u32,
    /// Populated previous-generation slots exist past the cursor page
    previous_generation: bool,
    /// Recovery stopped on a written slot; do not program into its page
    fresh_page_pending: bool,
    /// Abandoned page tails, ascending within each generation
    skipped: SpanList,
}

impl<'a, M, C, E, I> FlashRecorder<'a, M, C, E, I>
where
    M: FlashMedia,
    C: DataCache,
    E: CryptoEngine,
    I: RotationLog,
{
    /// Create a recorder over the configured area
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if the configuration does not validate,
    /// pages are not whole device sectors, the area is off the device, or
    /// an encrypted log has no rotation log.
    pub fn new(ctx: RecorderContext<'a, M, C, E>, config: RecorderConfig, info: I) -> Result<Self> {
        let region = LogRegion::from_config(&config)?;
        if M::SECTOR_SIZE == 0 || config.page_size as usize % M::SECTOR_SIZE != 0 {
            return Err(Error::InvalidConfig);
        }
        if region.end().raw() as usize > M::TOTAL_SIZE {
            return Err(Error::InvalidConfig);
        }
        if config.encrypted && !I::PRESENT {
            return Err(Error::InvalidConfig);
        }
        Ok(Self {
            ctx,
            config,
            region,
            info,
            keys: None,
            state: RecorderState::Uninitialized,
            write_cursor: region.begin(),
            last_id: 0,
            rotation_count: 1,
            previous_generation: false,
            fresh_page_pending: false,
            skipped: SpanList::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Lifecycle state
    #[must_use]
    pub const fn state(&self) -> RecorderState {
        self.state
    }

    /// Configuration
    #[must_use]
    pub const fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Area geometry
    #[must_use]
    pub const fn region(&self) -> &LogRegion {
        &self.region
    }

    /// First byte after the newest record
    #[must_use]
    pub const fn write_cursor(&self) -> FlashAddress {
        self.write_cursor
    }

    /// Id of the newest record (`0` for an empty log)
    #[must_use]
    pub const fn last_id(&self) -> u32 {
        self.last_id
    }

    /// Current generation
    #[must_use]
    pub const fn rotation_count(&self) -> u32 {
        self.rotation_count
    }

    /// Check whether no record has been written since the last format
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.write_cursor == self.region.begin()
    }

    /// Rotation log
    #[must_use]
    pub const fn info_log(&self) -> &I {
        &self.info
    }

    /// Rotation log, mutable
    pub fn info_log_mut(&mut self) -> &mut I {
        &mut self.info
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Recover a plaintext log from flash
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`] for an encrypted log; otherwise flash, crypto
    /// and rotation-log errors. Corrupted records end the scan and are not
    /// errors.
    pub fn init(&mut self) -> Result<RecoveryReport> {
        if self.config.encrypted {
            return Err(Error::InvalidKey);
        }
        self.recover()
    }

    /// Recover an encrypted log from flash with its provisioned keys
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for a plaintext log; otherwise as
    /// [`FlashRecorder::init`].
    pub fn init_with_keys(&mut self, keys: LogKeys) -> Result<RecoveryReport> {
        if !self.config.encrypted {
            return Err(Error::InvalidConfig);
        }
        self.keys = Some(keys);
        self.recover()
    }

    /// Erase the whole area and start a new generation
    ///
    /// Allowed in any state; the log is [`RecorderState::Ready`] afterwards
    /// (an encrypted log still needs its keys to append).
    ///
    /// # Errors
    ///
    /// Flash errors of the erase, and rotation-log errors that persist
    /// after one reformat of the rotation log.
    pub fn format(&mut self) -> Result<()> {
        let now = log_stamp(self.ctx.clock.now());
        if self.state == RecorderState::Uninitialized {
            self.info.prepare()?;
            self.rotation_count = self.info.latest_rotation()?.unwrap_or(1);
        }

        let sectors = self.region.len() / self.sector_size();
        self.ctx
            .dispatcher
            .erase_sectors(self.region.begin(), sectors, self.config.timeout)?;

        self.write_cursor = self.region.begin();
        self.last_id = 0;
        self.previous_generation = false;
        self.fresh_page_pending = false;
        self.skipped.clear();
        self.rotation_count = self.rotation_count.wrapping_add(1);
        self.state = RecorderState::Ready;
        log_info!(
            SYSTEM_LOG.lock(),
            now,
            LOG_MODULE,
            "formatted {} (rotation {})",
            self.region.begin(),
            self.rotation_count
        );

        self.record_rotation(RecordOrigin::Format, now)
    }

    fn recover(&mut self) -> Result<RecoveryReport> {
        let now = log_stamp(self.ctx.clock.now());
        self.info.prepare()?;
        self.rotation_count = self.info.latest_rotation()?.unwrap_or(1);
        self.write_cursor = self.region.begin();
        self.last_id = 0;
        self.previous_generation = false;
        self.fresh_page_pending = false;
        self.skipped.clear();

        let capacity = self.region.capacity();

        // Skip erased slots up to the first written one.
        let mut slot = 0;
        loop {
            if slot == capacity {
                self.state = RecorderState::Ready;
                return Ok(self.report(0, RecoveryStop::Empty, false));
            }
            if self.read_slot(slot, self.rotation_count)? != SlotContent::Erased {
                break;
            }
            slot += 1;
        }

        // Follow the id sequence of the current generation.
        let mut generation = self.rotation_count;
        let mut resumed = false;
        let mut records = 0u32;
        let mut newest: Option<(u32, u32)> = None;
        let mut bridged = SpanList::new();
        let stop = loop {
            if slot == capacity {
                break RecoveryStop::AreaEnd;
            }
            let content = self.read_slot(slot, generation)?;
            let continues = match &content {
                SlotContent::Record(rec) => newest.map_or(true, |(_, id)| rec.uuid() == next_uuid(id)),
                SlotContent::Erased | SlotContent::Corrupted => false,
            };
            let record = match content {
                SlotContent::Erased => break RecoveryStop::Erased,
                SlotContent::Record(rec) if continues => rec,
                other => {
                    let corrupted = matches!(other, SlotContent::Corrupted);
                    let resume = if corrupted {
                        self.try_resume(slot, records, generation)?
                    } else {
                        None
                    };
                    if let Some(rec) = resume {
                        generation = generation.wrapping_add(1);
                        resumed = true;
                        rec
                    } else if let Some((next, rec)) = self.bridge_hole(slot, newest, generation)? {
                        log_warn!(
                            SYSTEM_LOG.lock(),
                            now,
                            LOG_MODULE,
                            "skipping slots {}..{}, run continues past them",
                            slot,
                            next
                        );
                        push_span(
                            &mut bridged,
                            SkippedSpan {
                                generation,
                                start: slot,
                                end: next,
                            },
                        );
                        slot = next;
                        rec
                    } else if corrupted {
                        break RecoveryStop::Corrupted;
                    } else {
                        break RecoveryStop::Discontinuity;
                    }
                }
            };
            newest = Some((slot, record.uuid()));
            records += 1;
            slot += 1;
        };

        if let Some((last_slot, id)) = newest {
            let start = self.region.slot_address(last_slot).ok_or(Error::InternalError)?;
            self.write_cursor = start
                .checked_add(self.region.record_size())
                .ok_or(Error::InternalError)?;
            self.last_id = id;
            self.fresh_page_pending =
                matches!(stop, RecoveryStop::Corrupted | RecoveryStop::Discontinuity);
        }
        self.rotation_count = generation;
        self.previous_generation = self.probe_previous_generation()?;
        if self.previous_generation {
            self.scan_previous_spans()?;
        }
        for span in bridged {
            push_span(&mut self.skipped, span);
        }
        self.state = RecorderState::Ready;

        if resumed {
            log_warn!(
                SYSTEM_LOG.lock(),
                now,
                LOG_MODULE,
                "rotation {} was not persisted, resuming it",
                generation
            );
            self.record_rotation(RecordOrigin::Wrap, now)?;
        }
        if matches!(stop, RecoveryStop::Corrupted | RecoveryStop::Discontinuity) {
            log_debug!(
                SYSTEM_LOG.lock(),
                now,
                LOG_MODULE,
                "scan ended at slot {} ({:?})",
                slot,
                stop
            );
        }
        log_info!(
            SYSTEM_LOG.lock(),
            now,
            LOG_MODULE,
            "recovered {} records, last id {}, cursor {}",
            records,
            self.last_id,
            self.write_cursor
        );
        Ok(self.report(records, stop, resumed))
    }

    /// First slot of an encrypted log failing under the persisted
    /// generation may be a wrap whose rotation entry was lost.
    fn try_resume(&self, slot: u32, records: u32, generation: u32) -> Result<Option<StoredRecord>> {
        if slot != 0 || records != 0 || self.keys.is_none() || !I::PRESENT {
            return Ok(None);
        }
        match self.read_slot(slot, generation.wrapping_add(1))? {
            SlotContent::Record(rec) => Ok(Some(rec)),
            SlotContent::Erased | SlotContent::Corrupted => Ok(None),
        }
    }

    /// An append after a damaged slot goes to the next page, so the run may
    /// continue there. A damaged slot opening a page is rewritten in place
    /// instead and never bridged.
    fn bridge_hole(
        &self,
        slot: u32,
        newest: Option<(u32, u32)>,
        generation: u32,
    ) -> Result<Option<(u32, StoredRecord)>> {
        let Some((_, id)) = newest else {
            return Ok(None);
        };
        let per_page = self.region.records_per_page();
        if slot % per_page == 0 {
            return Ok(None);
        }
        let next = (slot / per_page + 1) * per_page;
        if next >= self.region.capacity() {
            return Ok(None);
        }
        match self.read_slot(next, generation)? {
            SlotContent::Record(rec) if rec.uuid() == next_uuid(id) => Ok(Some((next, rec))),
            _ => Ok(None),
        }
    }

    /// Previous-generation pages are written front to back and never
    /// start with a skipped slot, so the first slot of the last page tells
    /// whether they exist.
    fn probe_previous_generation(&self) -> Result<bool> {
        let (_, first_old) = self.generation_bounds();
        let capacity = self.region.capacity();
        if first_old >= capacity {
            return Ok(false);
        }
        let last_page = capacity - self.region.records_per_page();
        Ok(self.read_slot(last_page, self.rotation_count.wrapping_sub(1))? != SlotContent::Erased)
    }

    /// Find the abandoned page tails of the previous generation
    ///
    /// A page whose last slot holds no record either ends in a skipped
    /// span or carries a damaged last record; the id that opens the
    /// following page tells the two apart.
    fn scan_previous_spans(&mut self) -> Result<()> {
        let (_, first_old) = self.generation_bounds();
        let per_page = self.region.records_per_page();
        let capacity = self.region.capacity();
        let old = self.rotation_count.wrapping_sub(1);

        let mut page = first_old;
        while page < capacity {
            let end = page + per_page;
            if !matches!(self.read_slot(end - 1, old)?, SlotContent::Record(_)) {
                if let Some(start) = self.abandoned_tail(page, end, old)? {
                    push_span(
                        &mut self.skipped,
                        SkippedSpan {
                            generation: old,
                            start,
                            end,
                        },
                    );
                }
            }
            page = end;
        }
        Ok(())
    }

    /// First skipped slot of page `[page, end)`, if its records stop early
    /// and the run resumes at `end`
    fn abandoned_tail(&self, page: u32, end: u32, generation: u32) -> Result<Option<u32>> {
        let mut last_id = None;
        let mut slot = page;
        while slot < end {
            match self.read_slot(slot, generation)? {
                SlotContent::Record(rec) => last_id = Some(rec.uuid()),
                SlotContent::Erased | SlotContent::Corrupted => break,
            }
            slot += 1;
        }
        let Some(id) = last_id else {
            return Ok(None);
        };
        let (next, next_generation) = if end == self.region.capacity() {
            (0, generation.wrapping_add(1))
        } else {
            (end, generation)
        };
        match self.read_slot(next, next_generation)? {
            SlotContent::Record(rec) if rec.uuid() == next_uuid(id) => Ok(Some(slot)),
            _ => Ok(None),
        }
    }

    const fn report(&self, records: u32, stop: RecoveryStop, rotation_resumed: bool) -> RecoveryReport {
        RecoveryReport {
            records,
            stop,
            rotation: self.rotation_count,
            rotation_resumed,
        }
    }

    // =========================================================================
    // Append
    // =========================================================================

    /// Where the next record goes
    ///
    /// Stays in the cursor's page while a whole record still fits;
    /// otherwise moves to the next page boundary, wrapping to the area
    /// start at the end of the area.
    #[must_use]
    pub fn align_for_next(&self) -> (FlashAddress, Crossing) {
        let begin = self.region.begin().raw();
        let cursor = self.write_cursor.raw();
        if cursor <= begin {
            return (self.region.begin(), Crossing::NextPage);
        }
        let page = self.region.page_size();
        let offset = (cursor - begin) % page;
        if offset != 0 && page - offset >= self.region.record_size() && !self.fresh_page_pending {
            return (self.write_cursor, Crossing::None);
        }
        let boundary = if offset == 0 {
            Some(cursor)
        } else {
            (cursor - offset).checked_add(page)
        };
        match boundary {
            Some(next) if next < self.region.end().raw() => (FlashAddress::new(next), Crossing::NextPage),
            _ => (self.region.begin(), Crossing::WrappedArea),
        }
    }

    /// Append one record and return its id
    ///
    /// Payloads shorter than the slot's payload area are zero padded.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before `init`/`format`, [`Error::InvalidKey`]
    /// for an encrypted log without keys, [`Error::InvalidParameter`] for an
    /// oversized payload, [`Error::Busy`] on lock timeout, flash and crypto
    /// errors. A failed rotation-log update is retried once after
    /// reformatting the rotation log; the record itself is already stored
    /// when that error is returned.
    pub fn append(&mut self, payload: &[u8]) -> Result<u32> {
        self.ensure_ready()?;
        if payload.len() > self.config.payload_size() {
            return Err(Error::InvalidParameter);
        }

        let uuid = next_uuid(self.last_id);
        let timestamp = self.ctx.clock.now();
        let now = log_stamp(timestamp);
        let (target, crossing) = self.align_for_next();
        let generation = if crossing == Crossing::WrappedArea {
            self.rotation_count.wrapping_add(1)
        } else {
            self.rotation_count
        };
        let abandoned = self.abandoned_span(target, crossing)?;

        let sealed = self
            .codec()
            .seal(uuid, timestamp, payload, target, generation)?;

        if crossing != Crossing::None {
            let sectors = self.region.page_size() / self.sector_size();
            self.ctx
                .dispatcher
                .erase_sectors(self.region.page_start(target), sectors, self.config.timeout)?;
        }
        self.ctx
            .dispatcher
            .write_memory(target, &sealed, self.config.timeout)?;

        self.write_cursor = target
            .checked_add(self.region.record_size())
            .ok_or(Error::InternalError)?;
        self.last_id = uuid;
        self.fresh_page_pending = false;
        if let Some(span) = abandoned {
            push_span(&mut self.skipped, span);
        }
        log_debug!(SYSTEM_LOG.lock(), now, LOG_MODULE, "appended id {} at {}", uuid, target);

        if crossing == Crossing::WrappedArea {
            self.rotation_count = generation;
            self.previous_generation = true;
        }
        self.prune_spans();
        if crossing == Crossing::WrappedArea {
            log_info!(
                SYSTEM_LOG.lock(),
                now,
                LOG_MODULE,
                "area {} wrapped, rotation {}",
                self.region.begin(),
                generation
            );
            self.record_rotation(RecordOrigin::Wrap, now)?;
        }
        Ok(uuid)
    }

    /// Slots left behind when a damaged page tail is abandoned
    fn abandoned_span(&self, target: FlashAddress, crossing: Crossing) -> Result<Option<SkippedSpan>> {
        if !self.fresh_page_pending || crossing == Crossing::None {
            return Ok(None);
        }
        let start = self.region.slots_before(self.write_cursor);
        let end = match crossing {
            Crossing::WrappedArea => self.region.capacity(),
            Crossing::NextPage | Crossing::None => self.region.slot_of(target).ok_or(Error::InternalError)?,
        };
        Ok((start < end).then_some(SkippedSpan {
            generation: self.rotation_count,
            start,
            end,
        }))
    }

    /// Forget spans whose page the current generation has reclaimed
    fn prune_spans(&mut self) {
        let current = self.rotation_count;
        let previous = current.wrapping_sub(1);
        let (_, first_old) = self.generation_bounds();
        self.skipped.retain(|span| {
            span.generation == current || (span.generation == previous && span.start >= first_old)
        });
    }

    fn record_rotation(&mut self, origin: RecordOrigin, now: u32) -> Result<()> {
        if !I::PRESENT {
            return Ok(());
        }
        let entry = InfoRecord {
            rotation_number: self.rotation_count,
            origin,
        };
        if let Err(e) = self.info.record(entry) {
            log_warn!(
                SYSTEM_LOG.lock(),
                now,
                LOG_MODULE,
                "rotation log append failed ({}), reformatting it",
                e
            );
            self.info.reset()?;
            self.info.record(entry)?;
        }
        log_debug!(
            SYSTEM_LOG.lock(),
            now,
            LOG_MODULE,
            "rotation {} persisted ({:?})",
            entry.rotation_number,
            entry.origin
        );
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Address of record `id`, computed without touching flash
    ///
    /// `None` when the log is not ready, empty, or `id` lies outside the
    /// retained window. The slot may still have been lost to a reset;
    /// [`FlashRecorder::get_record`] verifies.
    #[must_use]
    pub fn get_address(&self, id: u32) -> Option<FlashAddress> {
        self.locate(id)
            .and_then(|loc| self.region.slot_address(loc.slot))
    }

    /// Read record `id`
    ///
    /// `Ok(None)` when the id is outside the retained window, the slot was
    /// overwritten by a newer id, or the record fails verification.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before `init`, [`Error::Busy`] on lock
    /// timeout, flash and crypto errors.
    pub fn get_record(&self, id: u32) -> Result<Option<StoredRecord>> {
        self.ensure_ready()?;
        let Some(loc) = self.locate(id) else {
            return Ok(None);
        };
        match self.read_slot(loc.slot, loc.generation)? {
            SlotContent::Record(rec) if rec.uuid() == id => Ok(Some(rec)),
            _ => Ok(None),
        }
    }

    /// Read the slot at a known address
    ///
    /// The generation is `rotation_count` for addresses before the cursor
    /// and `rotation_count - 1` for addresses at or after it.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] outside the area, [`Error::InvalidParameter`]
    /// off a slot boundary, [`Error::NotFound`] for an erased slot,
    /// [`Error::IntegrityCheckFailed`] for a corrupted one, plus the errors
    /// of [`FlashRecorder::get_record`].
    pub fn read_at(&self, address: FlashAddress) -> Result<StoredRecord> {
        self.ensure_ready()?;
        let address = self.region.address(address.raw())?;
        let slot = self.region.slot_of(address).ok_or(Error::InvalidParameter)?;
        let generation = if address < self.write_cursor {
            self.rotation_count
        } else {
            self.rotation_count.wrapping_sub(1)
        };
        match self.read_slot(slot, generation)? {
            SlotContent::Record(rec) => Ok(rec),
            SlotContent::Erased => Err(Error::NotFound),
            SlotContent::Corrupted => Err(Error::IntegrityCheckFailed),
        }
    }

    /// Id of the oldest retained record, `0` if there is none
    ///
    /// Scans from the page after the cursor through the end of the area,
    /// then from the area start up to the cursor.
    ///
    /// # Errors
    ///
    /// As [`FlashRecorder::get_record`].
    pub fn get_first_id(&self) -> Result<u32> {
        self.ensure_ready()?;
        Ok(self.oldest_id()?.unwrap_or(0))
    }

    /// Snapshot of position and occupancy
    ///
    /// # Errors
    ///
    /// As [`FlashRecorder::get_first_id`].
    pub fn get_status(&self) -> Result<RecorderStatus> {
        self.ensure_ready()?;
        let oldest = self.oldest_id()?;
        let count = match oldest {
            Some(first) if !self.is_empty() => uuid_distance(first, self.last_id).saturating_add(1),
            _ => 0,
        };
        Ok(RecorderStatus {
            last_id: self.last_id,
            first_id: oldest.unwrap_or(0),
            write_cursor: self.write_cursor,
            area_begin: self.region.begin(),
            area_len: self.region.len(),
            page_size: self.region.page_size(),
            record_size: self.region.record_size(),
            rotation_count: self.rotation_count,
            count,
        })
    }

    fn oldest_id(&self) -> Result<Option<u32>> {
        if self.is_empty() {
            return Ok(None);
        }
        let (current_end, first_old) = self.generation_bounds();
        if self.previous_generation {
            let old = self.rotation_count.wrapping_sub(1);
            for slot in first_old..self.region.capacity() {
                if let SlotContent::Record(rec) = self.read_slot(slot, old)? {
                    return Ok(Some(rec.uuid()));
                }
            }
        }
        for slot in 0..current_end {
            if let SlotContent::Record(rec) = self.read_slot(slot, self.rotation_count)? {
                return Ok(Some(rec.uuid()));
            }
        }
        Ok(None)
    }

    /// Slot of `id` by arithmetic on the distance back from the cursor,
    /// stepping over skipped spans
    fn locate(&self, id: u32) -> Option<Location> {
        if self.state != RecorderState::Ready || id == SENTINEL_UUID || self.is_empty() {
            return None;
        }
        let (current_end, first_old) = self.generation_bounds();
        let mut back = uuid_distance(id, self.last_id);
        if let Some(slot) = self.walk_back(&mut back, 0, current_end, self.rotation_count) {
            return Some(Location {
                slot,
                generation: self.rotation_count,
            });
        }
        if !self.previous_generation {
            return None;
        }
        let old = self.rotation_count.wrapping_sub(1);
        self.walk_back(&mut back, first_old, self.region.capacity(), old)
            .map(|slot| Location {
                slot,
                generation: old,
            })
    }

    /// Slot `back` ids below the top of `[floor, top)` in `generation`;
    /// on a miss, `back` is reduced by the ids the range holds.
    fn walk_back(&self, back: &mut u32, floor: u32, mut top: u32, generation: u32) -> Option<u32> {
        let spans = self
            .skipped
            .iter()
            .rev()
            .filter(|span| span.generation == generation && span.start >= floor);
        for span in spans {
            let run = top.saturating_sub(span.end);
            if *back < run {
                return Some(top - 1 - *back);
            }
            *back -= run;
            top = top.min(span.start);
        }
        let run = top.saturating_sub(floor);
        if *back < run {
            return Some(top - 1 - *back);
        }
        *back -= run;
        None
    }

    /// `(w, e)`: slots before the cursor, and the first slot of the page
    /// boundary at or after it
    fn generation_bounds(&self) -> (u32, u32) {
        let written = self.region.slots_before(self.write_cursor);
        let per_page = self.region.records_per_page();
        (written, written.div_ceil(per_page) * per_page)
    }

    /// Slot of the newest record
    pub(crate) fn newest_slot(&self) -> Option<u32> {
        self.generation_bounds().0.checked_sub(1)
    }

    pub(crate) fn read_slot(&self, slot: u32, generation: u32) -> Result<SlotContent> {
        let address = self.region.slot_address(slot).ok_or(Error::OutOfRange)?;
        self.codec().read(address, generation)
    }

    fn codec(&self) -> RecordCodec<'_, M, C, E> {
        RecordCodec::new(
            self.ctx.dispatcher,
            self.ctx.crypto,
            self.keys.as_ref(),
            self.region.record_size() as usize,
            self.config.timeout,
        )
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state != RecorderState::Ready {
            return Err(Error::NotInitialized);
        }
        if self.config.encrypted && self.keys.is_none() {
            return Err(Error::InvalidKey);
        }
        Ok(())
    }

    fn sector_size(&self) -> u32 {
        // new() checked the page size is a multiple of it, so it fits
        u32::try_from(M::SECTOR_SIZE).unwrap_or(self.region.page_size())
    }

}

/// Seconds of one operation's timestamp, as the log buffer stores them
fn log_stamp(now: Timestamp) -> u32 {
    u32::try_from(now.seconds).unwrap_or(u32::MAX)
}

/// Append `span`, dropping the oldest one when the list is full
fn push_span(spans: &mut SpanList, span: SkippedSpan) {
    if spans.is_full() {
        spans.remove(0);
    }
    // Cannot fail: a slot was just freed.
    let _ = spans.push(span);
}

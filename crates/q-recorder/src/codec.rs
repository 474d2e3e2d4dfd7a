// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Physical record layout and framing
//!
//! ```text
//! offset  size  field
//!      0    32  SHA-256 over bytes 32..record_size (plaintext)
//!     32     4  uuid, u32 LE
//!     36     8  timestamp seconds, u64 LE
//!     44     2  timestamp milliseconds, u16 LE
//!     46     n  payload, zero padded to the slot
//! ```
//!
//! The digest is computed over the plaintext and stored before
//! encryption. An encrypted log then runs the whole slot, digest included,
//! through AES-256-CTR with the IV
//! `nonce (8) || generation (u32 BE) || address (u32 BE)`.
//!
//! A slot reading back as all `0xFF` is erased; that is also why uuid
//! `0xFFFF_FFFF` is never assigned.

use crate::address::FlashAddress;
use crate::dispatcher::Dispatcher;
use heapless::Vec;
use q_common::constants::{
    AES_CTR_IV_SIZE, ERASED_BYTE, INFO_PAYLOAD_SIZE, LOG_NONCE_SIZE, MAX_RECORD_SIZE,
    RECORD_HEADER_SIZE, SENTINEL_UUID, SHA256_OUTPUT_SIZE,
};
use q_common::{Error, Result, Timeout, Timestamp};
use q_crypto::{constant_time_eq, CryptoEngine, CryptoService, CtrIv, LogKeys};
use q_hal::{DataCache, FlashMedia};

const UUID_OFFSET: usize = SHA256_OUTPUT_SIZE;
const TIMESTAMP_OFFSET: usize = UUID_OFFSET + 4;

/// Scratch buffer holding one slot
pub type RecordBuffer = Vec<u8, MAX_RECORD_SIZE>;

// =============================================================================
// Record ids
// =============================================================================

/// Id following `id`, skipping the erased-slot sentinel
#[must_use]
pub const fn next_uuid(id: u32) -> u32 {
    let next = id.wrapping_add(1);
    if next == SENTINEL_UUID {
        0
    } else {
        next
    }
}

/// Number of [`next_uuid`] steps from `older` to `newer`
#[must_use]
pub const fn uuid_distance(older: u32, newer: u32) -> u32 {
    let raw = newer.wrapping_sub(older);
    if older > newer {
        // The walk passed the sentinel, which is never issued.
        raw.wrapping_sub(1)
    } else {
        raw
    }
}

/// CTR IV for the record at `address` written in `generation`
///
/// Injective in `(generation, address)` for a fixed nonce.
#[must_use]
pub fn record_iv(nonce: &[u8; LOG_NONCE_SIZE], generation: u32, address: FlashAddress) -> CtrIv {
    let mut iv = [0u8; AES_CTR_IV_SIZE];
    iv[..LOG_NONCE_SIZE].copy_from_slice(nonce);
    iv[LOG_NONCE_SIZE..LOG_NONCE_SIZE + 4].copy_from_slice(&generation.to_be_bytes());
    iv[LOG_NONCE_SIZE + 4..].copy_from_slice(&address.raw().to_be_bytes());
    CtrIv::new(iv)
}

// =============================================================================
// Header and decoded records
// =============================================================================

/// Decoded record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Plaintext integrity digest
    pub digest: [u8; SHA256_OUTPUT_SIZE],
    /// Record id
    pub uuid: u32,
    /// Time of append
    pub timestamp: Timestamp,
}

impl RecordHeader {
    /// Encoded header size
    pub const SIZE: usize = RECORD_HEADER_SIZE;

    /// Parse from the start of a plaintext slot (at least [`Self::SIZE`] bytes)
    fn parse(bytes: &[u8]) -> Self {
        let mut digest = [0u8; SHA256_OUTPUT_SIZE];
        digest.copy_from_slice(&bytes[..UUID_OFFSET]);
        let uuid = u32::from_le_bytes([
            bytes[UUID_OFFSET],
            bytes[UUID_OFFSET + 1],
            bytes[UUID_OFFSET + 2],
            bytes[UUID_OFFSET + 3],
        ]);
        let mut ts = [0u8; Timestamp::ENCODED_SIZE];
        ts.copy_from_slice(&bytes[TIMESTAMP_OFFSET..Self::SIZE]);
        Self {
            digest,
            uuid,
            timestamp: Timestamp::from_le_bytes(&ts),
        }
    }
}

/// A verified record read back from flash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    address: FlashAddress,
    header: RecordHeader,
    bytes: RecordBuffer,
}

impl StoredRecord {
    /// Slot address
    #[must_use]
    pub const fn address(&self) -> FlashAddress {
        self.address
    }

    /// Decoded header
    #[must_use]
    pub const fn header(&self) -> &RecordHeader {
        &self.header
    }

    /// Record id
    #[must_use]
    pub const fn uuid(&self) -> u32 {
        self.header.uuid
    }

    /// Time of append
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.header.timestamp
    }

    /// Payload area of the slot, padding included
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[RecordHeader::SIZE..]
    }
}

/// What a slot holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    /// Never written since the last erase
    Erased,
    /// Written, but fails digest verification (torn, corrupted, or
    /// decrypted under the wrong generation)
    Corrupted,
    /// A verified record
    Record(StoredRecord),
}

// =============================================================================
// Info records
// =============================================================================

/// Why a rotation number was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordOrigin {
    /// The parent log was formatted
    Format = 0,
    /// The parent log's write cursor wrapped to the area start
    Wrap = 1,
}

impl RecordOrigin {
    /// Parse the stored origin byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Format),
            1 => Some(Self::Wrap),
            _ => None,
        }
    }
}

/// Payload of a rotation (info) log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoRecord {
    /// Generation in force after the event
    pub rotation_number: u32,
    /// Event that started the generation
    pub origin: RecordOrigin,
}

impl InfoRecord {
    /// Encode as `rotation (u32 LE) || origin (u8) || pad (u8)`
    #[must_use]
    pub fn encode(&self) -> [u8; INFO_PAYLOAD_SIZE] {
        let mut out = [0u8; INFO_PAYLOAD_SIZE];
        out[..4].copy_from_slice(&self.rotation_number.to_le_bytes());
        out[4] = self.origin as u8;
        out
    }

    /// Decode from a payload area; `None` for an unknown origin
    #[must_use]
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if payload.len() < INFO_PAYLOAD_SIZE {
            return None;
        }
        Some(Self {
            rotation_number: u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
            origin: RecordOrigin::from_u8(payload[4])?,
        })
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Encodes records into slots and decodes them back
///
/// Holds borrowed handles only; build one per operation.
pub struct RecordCodec<'a, M, C, E> {
    dispatcher: &'a Dispatcher<M, C>,
    crypto: &'a CryptoService<E>,
    keys: Option<&'a LogKeys>,
    record_size: usize,
    timeout: Timeout,
}

impl<'a, M: FlashMedia, C: DataCache, E: CryptoEngine> RecordCodec<'a, M, C, E> {
    /// Codec for slots of `record_size` bytes; `keys` enables encryption
    #[must_use]
    pub const fn new(
        dispatcher: &'a Dispatcher<M, C>,
        crypto: &'a CryptoService<E>,
        keys: Option<&'a LogKeys>,
        record_size: usize,
        timeout: Timeout,
    ) -> Self {
        Self {
            dispatcher,
            crypto,
            keys,
            record_size,
            timeout,
        }
    }

    /// Payload bytes per slot
    #[must_use]
    pub const fn payload_capacity(&self) -> usize {
        self.record_size.saturating_sub(RecordHeader::SIZE)
    }

    /// Build the stored bytes of a record
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if the payload does not fit or `uuid` is
    /// the sentinel, [`Error::MemoryAllocationFailed`] if the slot exceeds
    /// the scratch buffer, crypto errors from the service.
    pub fn seal(
        &self,
        uuid: u32,
        timestamp: Timestamp,
        payload: &[u8],
        address: FlashAddress,
        generation: u32,
    ) -> Result<RecordBuffer> {
        if payload.len() > self.payload_capacity() || uuid == SENTINEL_UUID {
            return Err(Error::InvalidParameter);
        }
        let mut buf = self.scratch()?;
        buf[UUID_OFFSET..TIMESTAMP_OFFSET].copy_from_slice(&uuid.to_le_bytes());
        buf[TIMESTAMP_OFFSET..RecordHeader::SIZE].copy_from_slice(&timestamp.to_le_bytes());
        buf[RecordHeader::SIZE..RecordHeader::SIZE + payload.len()].copy_from_slice(payload);

        let digest = self.crypto.hash(&buf[UUID_OFFSET..], self.timeout)?;
        buf[..UUID_OFFSET].copy_from_slice(&digest);

        self.apply_cipher(&mut buf, address, generation)?;
        Ok(buf)
    }

    /// Decode stored bytes in place
    ///
    /// # Errors
    ///
    /// [`Error::IntegrityCheckFailed`] if the digest does not match or the
    /// id is the sentinel; crypto errors from the service.
    pub fn open(&self, buf: &mut [u8], address: FlashAddress, generation: u32) -> Result<RecordHeader> {
        if buf.len() != self.record_size || buf.len() < RecordHeader::SIZE {
            return Err(Error::InvalidParameter);
        }
        self.apply_cipher(buf, address, generation)?;
        let header = RecordHeader::parse(buf);
        let digest = self.crypto.hash(&buf[UUID_OFFSET..], self.timeout)?;
        if !constant_time_eq(&digest, &header.digest) || header.uuid == SENTINEL_UUID {
            return Err(Error::IntegrityCheckFailed);
        }
        Ok(header)
    }

    /// Seal a record and program it at `address`
    ///
    /// The slot must already be erased.
    ///
    /// # Errors
    ///
    /// As [`RecordCodec::seal`], plus dispatcher errors.
    pub fn write(
        &self,
        address: FlashAddress,
        generation: u32,
        uuid: u32,
        timestamp: Timestamp,
        payload: &[u8],
    ) -> Result<()> {
        let buf = self.seal(uuid, timestamp, payload, address, generation)?;
        self.dispatcher.write_memory(address, &buf, self.timeout)
    }

    /// Read and classify the slot at `address`
    ///
    /// Digest failures are reported as [`SlotContent::Corrupted`], not as
    /// errors.
    ///
    /// # Errors
    ///
    /// Dispatcher and crypto errors ([`Error::Busy`], [`Error::FlashError`]).
    pub fn read(&self, address: FlashAddress, generation: u32) -> Result<SlotContent> {
        let mut buf = self.scratch()?;
        self.dispatcher.read_memory(address, &mut buf, self.timeout)?;
        if buf.iter().all(|&b| b == ERASED_BYTE) {
            return Ok(SlotContent::Erased);
        }
        match self.open(&mut buf, address, generation) {
            Ok(header) => Ok(SlotContent::Record(StoredRecord {
                address,
                header,
                bytes: buf,
            })),
            Err(Error::IntegrityCheckFailed) => Ok(SlotContent::Corrupted),
            Err(e) => Err(e),
        }
    }

    fn scratch(&self) -> Result<RecordBuffer> {
        let mut buf = RecordBuffer::new();
        buf.resize(self.record_size, 0)
            .map_err(|()| Error::MemoryAllocationFailed)?;
        Ok(buf)
    }

    fn apply_cipher(&self, buf: &mut [u8], address: FlashAddress, generation: u32) -> Result<()> {
        if let Some(keys) = self.keys {
            let iv = record_iv(keys.nonce(), generation, address);
            self.crypto.aes_ctr(keys.key(), &iv, buf, self.timeout)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_uuid_skips_sentinel() {
        assert_eq!(next_uuid(0), 1);
        assert_eq!(next_uuid(0xFFFF_FFFD), 0xFFFF_FFFE);
        assert_eq!(next_uuid(0xFFFF_FFFE), 0);
    }

    #[test]
    fn test_uuid_distance_across_sentinel() {
        assert_eq!(uuid_distance(5, 5), 0);
        assert_eq!(uuid_distance(1, 300), 299);
        assert_eq!(uuid_distance(0xFFFF_FFFE, 0), 1);
        assert_eq!(uuid_distance(0xFFFF_FFFD, 2), 4);
    }

    #[test]
    fn test_iv_layout() {
        let iv = record_iv(&[0xAA; 8], 0x0102_0304, FlashAddress::new(0x0A0B_0C0D));
        assert_eq!(
            iv.as_bytes(),
            &[0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 1, 2, 3, 4, 0x0A, 0x0B, 0x0C, 0x0D]
        );
    }

    #[test]
    fn test_iv_injective_over_generation_and_address() {
        let nonce = [7u8; 8];
        let generations = [0u32, 1, 2, 0xFF, 0x100, 0xFFFF_FFFF];
        let addresses = [0u32, 64, 4096, 0x100, 0x1_0000, 0xFFFF_FFC0];
        let mut seen: heapless::Vec<CtrIv, 64> = heapless::Vec::new();
        for g in generations {
            for a in addresses {
                let iv = record_iv(&nonce, g, FlashAddress::new(a));
                assert!(!seen.contains(&iv), "IV repeated for gen {g} addr {a:#x}");
                seen.push(iv).unwrap();
            }
        }
    }

    #[test]
    fn test_info_record_encoding() {
        let rec = InfoRecord {
            rotation_number: 0x0403_0201,
            origin: RecordOrigin::Wrap,
        };
        assert_eq!(rec.encode(), [1, 2, 3, 4, 1, 0]);
        assert_eq!(InfoRecord::decode(&rec.encode()), Some(rec));
        assert_eq!(InfoRecord::decode(&[1, 2, 3, 4, 9, 0]), None);
        assert_eq!(InfoRecord::decode(&[1, 2, 3]), None);
    }
}

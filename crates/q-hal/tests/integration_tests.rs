// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for q-hal
//!
//! Error mapping and the simulated flash/cache as seen through the
//! platform-agnostic traits.

mod error_tests {
    use q_hal::HalError;

    #[test]
    fn test_error_conversion_to_common() {
        let e: q_common::Error = HalError::FlashWriteFailed.into();
        assert_eq!(e, q_common::Error::FlashError);
        let e: q_common::Error = HalError::FlashOutOfBounds.into();
        assert_eq!(e, q_common::Error::OutOfRange);
        let e: q_common::Error = HalError::FlashMisaligned.into();
        assert_eq!(e, q_common::Error::InvalidParameter);
        let e: q_common::Error = HalError::Busy.into();
        assert_eq!(e, q_common::Error::Busy);
    }

    #[test]
    fn test_error_display_format() {
        assert_eq!(
            format!("{}", HalError::FlashEraseFailed),
            "[0x0813] flash erase failed"
        );
    }
}

mod flash_tests {
    use q_hal::sim::RamFlash;
    use q_hal::{FlashMedia, HalError};

    type Flash = RamFlash<{ 2 * 4096 }>;

    #[test]
    fn test_geometry_constants() {
        assert_eq!(Flash::SECTOR_SIZE, 4096);
        assert_eq!(Flash::PAGE_SIZE, 256);
        assert_eq!(Flash::TOTAL_SIZE, 8192);
    }

    #[test]
    fn test_erase_then_rewrite() {
        let mut flash = Flash::new();
        flash.write_page(4096, &[1, 2, 3, 4]).unwrap();
        assert!(flash.verify(4096, &[1, 2, 3, 4]).unwrap());

        flash.write_page(4096, &[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert!(flash.verify(4096, &[1, 2, 3, 4]).unwrap());

        flash.erase_sector(4096).unwrap();
        flash.write_page(4096, &[9, 9]).unwrap();
        assert!(flash.verify(4096, &[9, 9, 0xFF]).unwrap());
        assert!(!flash.verify(4096, &[1, 2]).unwrap());
    }

    #[test]
    fn test_read_out_of_bounds() {
        let flash = Flash::new();
        let mut buf = [0u8; 8];
        assert_eq!(flash.read(8190, &mut buf), Err(HalError::FlashOutOfBounds));
        assert_eq!(flash.read(u32::MAX, &mut buf), Err(HalError::FlashOutOfBounds));
    }

    #[test]
    fn test_corrupt_flips_bits() {
        let mut flash = Flash::new();
        flash.write_page(0, &[0x00]).unwrap();
        flash.corrupt(0, 0x80);
        assert_eq!(flash.as_bytes()[0], 0x80);
        flash.corrupt(1_000_000, 0xFF);
    }
}

mod cache_tests {
    use q_hal::sim::RecordingCache;
    use q_hal::{DataCache, NoCache};

    #[test]
    fn test_recording_cache_tracks_ranges() {
        let mut cache = RecordingCache::new();
        cache.invalidate(0x3000_0000, 256);
        cache.invalidate(0x3000_1000, 4096);
        assert_eq!(cache.invalidations(), 2);
        assert_eq!(cache.invalidated_bytes(), 4352);
        assert_eq!(cache.last_range(), Some((0x3000_1000, 4096)));
    }

    #[test]
    fn test_no_cache_is_inert() {
        let mut cache = NoCache;
        cache.invalidate(0, usize::MAX);
        assert_eq!(cache, NoCache);
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for q-common
//!
//! Exercise the public API the recorder stack relies on: error codes,
//! layout/config validation, timestamps, bounded locking and the system log.

mod error_tests {
    use q_common::Error;
    use std::collections::HashSet;

    const ALL: [Error; 18] = [
        Error::InvalidKey,
        Error::HashError,
        Error::HardwareInitFailed,
        Error::FlashError,
        Error::MemoryAllocationFailed,
        Error::BufferTooSmall,
        Error::InvalidParameter,
        Error::Timeout,
        Error::Busy,
        Error::NotImplemented,
        Error::InternalError,
        Error::InvalidState,
        Error::CryptoError,
        Error::IntegrityCheckFailed,
        Error::NotFound,
        Error::OutOfRange,
        Error::InvalidConfig,
        Error::NotInitialized,
    ];

    #[test]
    fn test_error_codes_unique() {
        let unique_errors: HashSet<u16> = ALL.iter().map(Error::code).collect();
        assert_eq!(unique_errors.len(), ALL.len());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::InvalidKey.code() >> 8, 0x01);
        assert_eq!(Error::FlashError.code() >> 8, 0x08);
        assert_eq!(Error::MemoryAllocationFailed.code() >> 8, 0x09);
        assert_eq!(Error::OutOfRange.code() >> 8, 0xFF);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::Busy.is_retryable());
        assert!(Error::MemoryAllocationFailed.is_retryable());
        assert!(!Error::IntegrityCheckFailed.is_retryable());
        assert!(!Error::FlashError.is_retryable());
        assert!(Error::IntegrityCheckFailed.is_integrity_error());
    }

    #[test]
    fn test_error_display() {
        let display = format!("{}", Error::Busy);
        assert_eq!(display, "[0xFF04] busy");
        assert!(format!("{}", Error::OutOfRange).contains("0xFF0E"));
    }
}

mod config_tests {
    use q_common::constants::{INFO_RECORD_SIZE, RECORD_HEADER_SIZE};
    use q_common::{FlashLayout, RecorderConfig, Timeout};

    #[test]
    fn test_datalogger_and_info_configs() {
        let layout = FlashLayout::new(0, 4, 2);
        let main = RecorderConfig::datalogger(&layout, 64).encrypted();
        let info = RecorderConfig::info_log(&layout);

        assert!(main.validate().is_ok());
        assert!(main.encrypted);
        assert_eq!(main.area_end(), Some(info.area_begin));
        assert!(!info.encrypted);
        assert_eq!(info.record_size as usize, INFO_RECORD_SIZE);
        assert_eq!(main.payload_size(), 64 - RECORD_HEADER_SIZE);
    }

    #[test]
    fn test_timeout_override() {
        let cfg = RecorderConfig::new(0, 4096, 64).with_timeout(Timeout::NoWait);
        assert_eq!(cfg.timeout, Timeout::NoWait);
        assert_eq!(RecorderConfig::new(0, 4096, 64).timeout, Timeout::DEFAULT);
    }

    #[test]
    fn test_record_larger_than_page_rejected() {
        let mut cfg = RecorderConfig::new(0, 1024, 1024);
        cfg.page_size = 512;
        assert!(cfg.validate().is_err());
    }
}

mod time_tests {
    use q_common::time::FixedTime;
    use q_common::{TimeSource, Timestamp};

    #[test]
    fn test_fixed_time_source() {
        let clock = FixedTime(Timestamp::new(1_700_000_000, 250));
        assert_eq!(clock.now(), Timestamp::new(1_700_000_000, 250));
        assert_eq!(format!("{}", clock.now()), "1700000000.250");
    }
}

mod sync_tests {
    use q_common::{Error, TimedMutex, Timeout};

    #[test]
    fn test_contention_reports_busy() {
        let lock = TimedMutex::new([0u8; 4]);
        let guard = lock.lock(Timeout::Forever).unwrap();
        assert_eq!(lock.lock(Timeout::Spins(10)).err(), Some(Error::Busy));
        drop(guard);
        assert!(lock.lock(Timeout::NoWait).is_ok());
    }

    #[test]
    fn test_cross_thread_serialization() {
        use std::sync::Arc;

        let lock = Arc::new(TimedMutex::new(0u32));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let l = Arc::clone(&lock);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        *l.lock(Timeout::Forever).unwrap() += 1;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.lock(Timeout::NoWait).unwrap(), 4000);
    }
}

mod log_tests {
    use q_common::log::{LogLevel, SYSTEM_LOG};
    use q_common::{log_info, log_warn};

    #[test]
    fn test_system_log_records_entries() {
        log_info!(SYSTEM_LOG.lock(), 3, "itest", "hello {}", 42);
        log_warn!(SYSTEM_LOG.lock(), 4, "itest", "careful");
        let log = SYSTEM_LOG.lock();
        assert!(log.contains("itest", "hello 42"));
        assert!(log
            .iter()
            .any(|e| e.level == LogLevel::Warn && e.module == "itest"));
    }
}

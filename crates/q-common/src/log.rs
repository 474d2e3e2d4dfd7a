// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Logging infrastructure for Qbitel EdgeOS
//!
//! A lightweight, `no_std` logging system. Entries go into a bounded ring
//! ([`LogBuffer`]) that evicts the oldest entry when full; the process-wide
//! instance is [`SYSTEM_LOG`].
//!
//! # Security
//!
//! - Key material and nonces must NEVER be logged
//! - Log levels control what is kept in production vs development

use core::fmt::{self, Write};
use heapless::{Deque, String};
use spin::Mutex;

/// Maximum log message length
pub const MAX_LOG_MESSAGE_LEN: usize = 128;

/// Log buffer size (number of entries)
pub const LOG_BUFFER_SIZE: usize = 32;

/// System-wide log buffer shared by every component.
pub static SYSTEM_LOG: Mutex<LogBuffer> = Mutex::new(LogBuffer::new());

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Errors that require immediate attention
    Error = 0,
    /// Warnings about potential issues
    Warn = 1,
    /// Informational messages
    Info = 2,
    /// Debug messages (development only)
    Debug = 3,
    /// Trace messages (very verbose, development only)
    Trace = 4,
}

impl LogLevel {
    /// Get the log level name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Get a short prefix for the log level
    #[must_use]
    pub const fn prefix(&self) -> char {
        match self {
            Self::Error => 'E',
            Self::Warn => 'W',
            Self::Info => 'I',
            Self::Debug => 'D',
            Self::Trace => 'T',
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log entry structure
#[derive(Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Timestamp (seconds from the recorder time source)
    pub timestamp: u32,
    /// Module/component name
    pub module: &'static str,
    /// Log message, truncated to [`MAX_LOG_MESSAGE_LEN`]
    pub message: String<MAX_LOG_MESSAGE_LEN>,
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:08X}] {} [{}] {}",
            self.timestamp,
            self.level.prefix(),
            self.module,
            self.message
        )
    }
}

/// Truncating writer; formatting never fails, overflow is cut off.
struct Truncating<'a>(&'a mut String<MAX_LOG_MESSAGE_LEN>);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Bounded log ring
pub struct LogBuffer {
    entries: Deque<LogEntry, LOG_BUFFER_SIZE>,
    min_level: LogLevel,
    evicted: u32,
}

impl LogBuffer {
    /// Create a new empty log buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            min_level: LogLevel::Info,
            evicted: 0,
        }
    }

    /// Set the minimum log level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Get the minimum log level
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Check if a log level should be recorded
    #[must_use]
    pub const fn should_log(&self, level: LogLevel) -> bool {
        (level as u8) <= (self.min_level as u8)
    }

    /// Log with format arguments
    pub fn log(&mut self, level: LogLevel, timestamp: u32, module: &'static str, args: fmt::Arguments<'_>) {
        if !self.should_log(level) {
            return;
        }

        let mut message = String::new();
        let _ = Truncating(&mut message).write_fmt(args);

        if self.entries.is_full() {
            self.entries.pop_front();
            self.evicted = self.evicted.saturating_add(1);
        }
        // Cannot fail: a slot was freed above.
        let _ = self.entries.push_back(LogEntry {
            level,
            timestamp,
            module,
            message,
        });
    }

    /// Get the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped to make room since the last `clear`
    #[must_use]
    pub const fn evicted(&self) -> u32 {
        self.evicted
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.evicted = 0;
    }

    /// Most recent entry
    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Iterate over entries (oldest first)
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter()
    }

    /// Check whether any entry from `module` contains `needle`
    #[must_use]
    pub fn contains(&self, module: &str, needle: &str) -> bool {
        self.iter()
            .any(|e| e.module == module && e.message.contains(needle))
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($buffer:expr, $ts:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Error, $ts, $module, format_args!($($arg)*))
    };
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($buffer:expr, $ts:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Warn, $ts, $module, format_args!($($arg)*))
    };
}

/// Log an informational message
#[macro_export]
macro_rules! log_info {
    ($buffer:expr, $ts:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Info, $ts, $module, format_args!($($arg)*))
    };
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($buffer:expr, $ts:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Debug, $ts, $module, format_args!($($arg)*))
    };
}

/// Log a trace-level message
#[macro_export]
macro_rules! log_trace {
    ($buffer:expr, $ts:expr, $module:expr, $($arg:tt)*) => {
        $buffer.log($crate::log::LogLevel::Trace, $ts, $module, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let mut buf = LogBuffer::new();
        log_debug!(buf, 1, "test", "hidden {}", 1);
        assert!(buf.is_empty());

        buf.set_min_level(LogLevel::Debug);
        log_debug!(buf, 2, "test", "shown {}", 2);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.latest().map(|e| e.message.as_str()), Some("shown 2"));
    }

    #[test]
    fn test_eviction_keeps_newest() {
        let mut buf = LogBuffer::new();
        for i in 0..(LOG_BUFFER_SIZE as u32 + 5) {
            log_info!(buf, i, "ring", "entry {}", i);
        }
        assert_eq!(buf.len(), LOG_BUFFER_SIZE);
        assert_eq!(buf.evicted(), 5);
        assert_eq!(buf.iter().next().map(|e| e.timestamp), Some(5));
        assert!(buf.contains("ring", "entry 36"));
        assert!(!buf.contains("ring", "entry 4"));
    }

    #[test]
    fn test_long_message_truncated() {
        let mut buf = LogBuffer::new();
        let long = [b'x'; 300];
        let text = core::str::from_utf8(&long).unwrap();
        log_error!(buf, 0, "trunc", "{}", text);
        assert_eq!(buf.latest().map(|e| e.message.len()), Some(MAX_LOG_MESSAGE_LEN));
    }
}

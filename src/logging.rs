//! Interrupt-safe logging for the AFSK front-end.
//!
//! ```text
//! sampling ISR           LogStream            foreground
//! ────────────           ─────────            ──────────
//!
//! rt_log!() ──────────▶ [L0][L1][L2] ──────▶ log_drain → console
//! fixed buffer            lock-free           blocking ok
//! never blocks            ring buffer
//! ```
//!
//! Entries are stamped with the sample tick counter, so a log line lines up
//! with the exact sample it was emitted on. Messages are dropped (and
//! counted) when the ring is full.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 64;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Sample tick the entry was pushed on.
    pub tick: u32,
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        tick: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text; invalid UTF-8 is replaced by a marker.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log ring (single producer, single consumer).
///
/// Each context owns one stream: the sampling interrupt pushes to
/// `SharedState::rt_log`, foreground code to `SharedState::bg_log`.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: the producer only writes the slot at write_idx before publishing
// it; the single consumer only reads slots below write_idx.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry. O(1), never blocks.
    ///
    /// Returns `false` if the ring was full and the message was dropped.
    #[inline]
    pub fn push(&self, tick: u32, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: single producer; the slot is not visible to the consumer
        // until write_idx is published below.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.tick = tick;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Take the oldest entry, if any.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: single consumer, slot is below write_idx
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, truncating at the end.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = SliceWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `fmt::Write` over a byte slice; excess output is cut off.
pub(crate) struct SliceWriter<'a> {
    pub(crate) buf: &'a mut [u8],
    pub(crate) pos: usize,
}

impl core::fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let to_write = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Interrupt-safe log macro.
///
/// ```ignore
/// rt_log!(LogLevel::Info, RT_LOG_STREAM, tick, "tx {:?}", state);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $tick:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($tick, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $tick, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $tick, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $tick, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $tick, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, b"init ch=0"));
        assert!(stream.has_entries());
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.tick, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.text(), "init ch=0");

        assert!(!stream.has_entries());
    }

    #[test]
    fn test_log_stream_full() {
        let stream = LogStream::<4>::new();

        assert!(stream.push(1, LogLevel::Info, b"1"));
        assert!(stream.push(2, LogLevel::Info, b"2"));
        assert!(stream.push(3, LogLevel::Info, b"3"));
        assert!(stream.push(4, LogLevel::Info, b"4"));

        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);
        assert_eq!(stream.pending(), 4);

        assert_eq!(stream.drain().map(|e| e.tick), Some(1));
        assert!(stream.push(6, LogLevel::Info, b"6"));
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'x'; MAX_MSG_LEN + 10];
        stream.push(0, LogLevel::Warn, &long);
        assert_eq!(stream.drain().unwrap().len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("reload {}", 1665));
        assert_eq!(&buf[..len], b"reload 1665");

        let mut small = [0u8; 4];
        let len = format_to_buffer(&mut small, format_args!("reload {}", 1665));
        assert_eq!(&small[..len], b"relo");
    }

    #[test]
    fn test_macro_pushes_formatted_entry() {
        let stream = LogStream::<4>::new();
        crate::rt_warn!(stream, 7, "ch={} rate={}", 3, 9600);
        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.tick, 7);
        assert_eq!(entry.text(), "ch=3 rate=9600");
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_producer_and_drain_on_separate_threads() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let producer = {
            let stream = Arc::clone(&stream);
            thread::spawn(move || {
                for tick in 0..200u32 {
                    while !stream.push(tick, LogLevel::Debug, b"tick") {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut expected = 0u32;
        while expected < 200 {
            if let Some(entry) = stream.drain() {
                assert_eq!(entry.tick, expected);
                assert_eq!(entry.text(), "tick");
                expected += 1;
            } else {
                thread::yield_now();
            }
        }
        producer.join().unwrap();
    }
}

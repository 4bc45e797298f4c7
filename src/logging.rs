//! ISR-safe logging for the delay line.
//!
//! Edge capture runs in interrupt context and the dispatcher runs in a loop
//! that must never stall, so neither may call a blocking log sink. Both push
//! fixed-size records into a lock-free ring instead; the serial service
//! drains it to the UART outside the hot path.
//!
//! ```text
//! ISR / poll loop          LogRing            serial service
//! ───────────────          ───────            ──────────────
//! isr_warn!() ──────▶ [r0][r1][r2] ──────▶ UART TX
//! non-blocking         lock-free            blocking ok
//! ```
//!
//! Records are dropped (and counted) when the ring is full — losing a
//! diagnostic line is acceptable, stalling an edge handler is not.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length per record.
pub const MAX_RECORD_LEN: usize = 96;

/// Ring capacity (number of records). Must be a power of 2.
pub const LOG_RING_SIZE: usize = 128;

/// Log severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A single log record.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogRecord {
    /// Timestamp in milliseconds (wrapping clock).
    pub timestamp_ms: u32,
    /// Severity.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub text: [u8; MAX_RECORD_LEN],
}

impl LogRecord {
    const EMPTY: Self = Self {
        timestamp_ms: 0,
        level: LogLevel::Info,
        len: 0,
        text: [0; MAX_RECORD_LEN],
    };

    /// Message as str, lossy on truncated UTF-8.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.text[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

/// Lock-free MPSC log ring: ISRs and the poll loop push, the serial service
/// drains.
///
/// Producers coordinate through an atomic `fetch_add` on the write index, so
/// concurrent pushes from interrupt and polling context get distinct slots.
/// Push never blocks; a full ring drops the record and bumps the counter.
pub struct LogRing<const N: usize = LOG_RING_SIZE> {
    records: UnsafeCell<[LogRecord; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Producers get unique slots via fetch_add; the single consumer only
// reads slots the producers have released.
unsafe impl<const N: usize> Sync for LogRing<N> {}
unsafe impl<const N: usize> Send for LogRing<N> {}

impl<const N: usize> LogRing<N> {
    const MASK: usize = N - 1;

    /// Create a new empty ring.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log ring size must be power of 2");

        Self {
            records: UnsafeCell::new([LogRecord::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a record. Never blocks; returns `false` if the ring was full
    /// and the record was dropped.
    #[inline]
    pub fn push(&self, timestamp_ms: u32, level: LogLevel, msg: &[u8]) -> bool {
        // Claim a slot only when there is room; a dropped record must not
        // advance the write index or the consumer would drain stale slots.
        let mut write = self.write_idx.load(Ordering::Relaxed);
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => write = actual,
            }
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: fetch_add handed this producer a unique slot
        unsafe {
            let record = &mut (*self.records.get())[idx];
            record.timestamp_ms = timestamp_ms;
            record.level = level;
            record.len = msg.len().min(MAX_RECORD_LEN) as u8;
            record.text[..record.len as usize].copy_from_slice(&msg[..record.len as usize]);
        }

        true
    }

    /// Pop the next record, if any. Single consumer only.
    #[inline]
    pub fn drain(&self) -> Option<LogRecord> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: Single consumer, slot released by a producer
        let record = unsafe { (*self.records.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(record)
    }

    /// Records dropped because the ring was full.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset the dropped counter after reporting.
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Records waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Global log ring. Single-core target, one stream is enough.
pub static LOG: LogRing = LogRing::new();

/// Format arguments into a byte buffer, truncating on overflow.
///
/// Returns the number of bytes written.
#[inline]
pub fn write_args(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// ISR-safe log macro.
///
/// Use this anywhere a blocking sink is off limits.
///
/// # Example
///
/// ```ignore
/// isr_log!(LogLevel::Warn, LOG, now_ms, "overrun, {} total", count);
/// ```
#[macro_export]
macro_rules! isr_log {
    ($level:expr, $ring:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_RECORD_LEN];
        let len = $crate::logging::write_args(&mut buf, format_args!($($arg)*));
        $ring.push($timestamp, $level, &buf[..len]);
    }};
}

/// ISR-safe error log.
#[macro_export]
macro_rules! isr_error {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($crate::logging::LogLevel::Error, $ring, $timestamp, $($arg)*)
    };
}

/// ISR-safe warning log.
#[macro_export]
macro_rules! isr_warn {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($crate::logging::LogLevel::Warn, $ring, $timestamp, $($arg)*)
    };
}

/// ISR-safe info log.
#[macro_export]
macro_rules! isr_info {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($crate::logging::LogLevel::Info, $ring, $timestamp, $($arg)*)
    };
}

/// ISR-safe debug log.
#[macro_export]
macro_rules! isr_debug {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($crate::logging::LogLevel::Debug, $ring, $timestamp, $($arg)*)
    };
}

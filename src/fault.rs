//! Fault accounting for the delay engine.
//!
//! A queue overrun does not stop anything — the ring's silent-overwrite
//! behavior is part of the contract — but it must not be invisible either.
//! The log records what happened last and how often, nothing more.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Fault codes the engine can record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault recorded.
    None = 0,

    /// Writer lapped the reader: a full buffer of pending transitions was
    /// discarded. Input edge rate × latency exceeded capacity.
    QueueOverrun = 1,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::QueueOverrun,
            _ => FaultCode::None,
        }
    }
}

/// Lock-free fault log, safe to record from interrupt context.
///
/// `clear()` resets the last-fault fields but the running count survives —
/// fault history is diagnostics, not state.
pub struct FaultLog {
    /// Most recent fault code.
    code: AtomicU8,

    /// Code-specific detail (for overruns: entries discarded).
    data: AtomicU32,

    /// Total faults since boot.
    count: AtomicU32,
}

impl FaultLog {
    pub const fn new() -> Self {
        Self {
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Record a fault occurrence.
    #[inline]
    pub fn record(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Most recent fault code.
    #[inline]
    pub fn last_code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    /// Detail of the most recent fault.
    #[inline]
    pub fn last_data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    /// Total faults since boot.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Forget the last fault; the running count is preserved.
    #[inline]
    pub fn clear(&self) {
        self.code.store(FaultCode::None as u8, Ordering::Release);
        self.data.store(0, Ordering::Release);
    }

    /// Consistent-enough snapshot for reporting.
    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            code: self.last_code(),
            data: self.last_data(),
            count: self.count(),
        }
    }
}

impl Default for FaultLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Fault log contents at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FaultSnapshot {
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_clear() {
        let log = FaultLog::new();
        assert_eq!(log.last_code(), FaultCode::None);
        assert_eq!(log.count(), 0);

        log.record(FaultCode::QueueOverrun, 512);
        assert_eq!(log.last_code(), FaultCode::QueueOverrun);
        assert_eq!(log.last_data(), 512);
        assert_eq!(log.count(), 1);

        log.clear();
        assert_eq!(log.last_code(), FaultCode::None);
        assert_eq!(log.count(), 1); // Count preserved
    }

    #[test]
    fn test_count_accumulates() {
        let log = FaultLog::new();
        log.record(FaultCode::QueueOverrun, 8);
        log.record(FaultCode::QueueOverrun, 8);
        log.record(FaultCode::QueueOverrun, 8);
        assert_eq!(log.count(), 3);
    }
}

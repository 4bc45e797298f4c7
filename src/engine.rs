//! Module: engine
//!
//! Purpose: The delay line engine — edge capture, delayed dispatch, and
//! configuration swap over one shared-state handle.
//!
//! # Architecture
//!
//! ```text
//! edge ISR ───▶ on_rising/on_falling ──▶ queue.schedule ─┐
//!                     (direct mode: drive output now)    │
//!                                                        ▼
//! main loop ──▶ poll ────────────────▶ queue.advance ──▶ output
//!
//! serial  ────▶ configure ──▶ swap config + reset queue + force deassert
//! ```
//!
//! Three contexts touch the same cursors, slots, configuration, and output
//! capability. None of that state is word-atomic as a whole, so every entry
//! point takes the critical section and works on a consistent view; no
//! operation blocks, sleeps, or allocates inside it.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::fault::{FaultCode, FaultLog};
use crate::flags::{decode_byte, DelayConfig};
use crate::hal::OutputDrive;
use crate::queue::{TransitionQueue, DEFAULT_CAPACITY};
use crate::signal::{Edge, Level};

/// Everything the three contexts share, guarded as one unit.
struct Shared<O, const N: usize> {
    queue: TransitionQueue<N>,
    config: DelayConfig,
    output: O,
}

/// A single-channel digital delay line.
///
/// Reproduces input transitions on the output after the configured latency,
/// or mirrors them directly in pass-through mode. Construction is `const`,
/// so the engine can live in a `static` and be reached from ISRs.
///
/// # Example
///
/// ```ignore
/// static DELAY_LINE: DelayLine<GpioOutput, 512> =
///     DelayLine::new(GpioOutput::new(OUTPUT_PIN));
///
/// // rising-edge ISR:
/// DELAY_LINE.on_rising(now_ms());
///
/// // main loop:
/// loop {
///     DELAY_LINE.poll(now_ms());
/// }
/// ```
pub struct DelayLine<O: OutputDrive, const N: usize = DEFAULT_CAPACITY> {
    shared: Mutex<RefCell<Shared<O, N>>>,
    faults: FaultLog,
}

impl<O: OutputDrive, const N: usize> DelayLine<O, N> {
    /// Create a disabled delay line owning `output`.
    pub const fn new(output: O) -> Self {
        Self {
            shared: Mutex::new(RefCell::new(Shared {
                queue: TransitionQueue::new(),
                config: DelayConfig::DISABLED,
                output,
            })),
            faults: FaultLog::new(),
        }
    }

    /// Rising-edge capture handler. ISR context.
    #[inline]
    pub fn on_rising(&self, now_ms: u32) {
        self.on_edge(Edge::Rising, now_ms);
    }

    /// Falling-edge capture handler. ISR context.
    #[inline]
    pub fn on_falling(&self, now_ms: u32) {
        self.on_edge(Edge::Falling, now_ms);
    }

    fn on_edge(&self, edge: Edge, now_ms: u32) {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let shared = &mut *shared;

            if !shared.config.enabled {
                return;
            }

            if shared.config.has_delay {
                let target = now_ms.wrapping_add(shared.config.latency_ms);
                if shared.queue.schedule(edge, target) {
                    self.faults.record(FaultCode::QueueOverrun, N as u32);
                }
            } else {
                // Direct mode: mirror the input, queue untouched
                Self::drive(&mut shared.output, edge.level());
            }
        });
    }

    /// Dispatch due transitions. Polling context; never blocks.
    ///
    /// No-op unless delayed output generation is active and work is pending.
    pub fn poll(&self, now_ms: u32) {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let shared = &mut *shared;

            if !shared.config.enabled || !shared.config.has_delay {
                return;
            }
            if shared.queue.is_empty() {
                return;
            }

            let level = shared.queue.advance(now_ms);
            Self::drive(&mut shared.output, level);
        });
    }

    /// Process one received configuration byte.
    ///
    /// Bytes below `0x20` are ignored. Returns the applied configuration so
    /// the caller can acknowledge it.
    pub fn configure(&self, byte: u8) -> Option<DelayConfig> {
        let config = decode_byte(byte)?;
        self.apply(config);
        Some(config)
    }

    /// Replace the configuration wholesale and reset the engine.
    ///
    /// One atomic unit with respect to the edge handlers and the poller:
    /// the new mode is installed, all pending transitions are dropped, and
    /// the output is forced deasserted so no stale "on" state survives.
    pub fn apply(&self, config: DelayConfig) {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let shared = &mut *shared;

            shared.config = config;
            shared.queue.reset();
            Self::drive(&mut shared.output, Level::Deasserted);
        });
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> DelayConfig {
        critical_section::with(|cs| self.shared.borrow_ref(cs).config)
    }

    /// Whether any scheduled transitions are waiting to be dispatched.
    pub fn has_pending(&self) -> bool {
        critical_section::with(|cs| !self.shared.borrow_ref(cs).queue.is_empty())
    }

    /// Fault counters (queue overruns).
    #[inline]
    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    #[inline]
    fn drive(output: &mut O, level: Level) {
        match level {
            Level::Asserted => output.assert_output(),
            Level::Deasserted => output.deassert_output(),
        }
    }
}

//! Hardware Abstraction Layer for the delay line.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Business logic stays in core modules, HAL is just I/O.

pub mod gpio;

/// The output capability: drive the output signal to a level.
///
/// Both operations are idempotent, complete synchronously, and must be safe
/// to call from interrupt context — direct mode drives the pin from the edge
/// ISR.
pub trait OutputDrive {
    fn assert_output(&mut self);
    fn deassert_output(&mut self);
}

/// Monotonic wrapping millisecond clock.
#[cfg(target_os = "espidf")]
#[inline]
pub fn now_ms() -> u32 {
    // esp_timer_get_time is ISR-safe; truncation gives the wrapping u32
    // the engine expects
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u32
}

//! # RustGpioDelayLine
//!
//! Digital delay line for a GPIO edge signal: every transition observed on
//! the input is reproduced on the output after a host-configurable latency.
//!
//! ## Architecture
//!
//! All pending transitions flow through one [`TransitionQueue`] owned by the
//! [`DelayLine`] engine:
//! - Edge ISRs enqueue target timestamps (or drive the output directly in
//!   pass-through mode)
//! - The main loop polls due entries out and drives the output
//! - The serial channel swaps the configuration atomically and resets the
//!   engine
//!
//! The engine core is hardware-free and host-testable; ESP-IDF touches only
//! the `hal`, `serial`, and binary layers.

#![cfg_attr(not(test), no_std)]

pub mod engine;
pub mod fault;
pub mod flags;
pub mod hal;
pub mod logging;
pub mod queue;
pub mod serial;
pub mod signal;

pub use engine::DelayLine;
pub use fault::{FaultCode, FaultLog};
pub use flags::{decode_byte, decode_flags, DelayConfig};
pub use hal::OutputDrive;
pub use logging::{LogLevel, LogRing};
pub use queue::TransitionQueue;
pub use signal::{Edge, Level};

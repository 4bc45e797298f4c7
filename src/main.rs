//! RustGpioDelayLine - Main entry point
//!
//! Wires the hardware to the engine:
//! 1. Output pin, parked deasserted
//! 2. Both-edge interrupt on the input pin, dispatching by sampled level
//! 3. UART1 for configuration bytes in, diagnostics out
//! 4. Unbounded polling loop: dispatch due transitions, service the serial
//!    link

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

// The firmware entry point targets ESP-IDF hardware only. On any other target
// (e.g. the host that runs the test suite) the GPIO/UART wiring cannot be
// built, so the binary reduces to an inert stub. All testable logic lives in
// the library and is exercised by the host test suite.
#[cfg(not(target_os = "espidf"))]
fn main() {}

#[cfg(target_os = "espidf")]
use core::ffi::c_void;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys as esp_idf_sys;

#[cfg(target_os = "espidf")]
use rust_gpio_delay_line::{
    engine::DelayLine,
    hal::{
        self,
        gpio::{GpioOutput, InputConfig, OutputConfig},
    },
    isr_info,
    logging::LOG,
    queue::DEFAULT_CAPACITY,
    serial::{self, SerialConfig, SerialConsole},
};

/// Version string (set by build.rs, includes git hash)
#[cfg(target_os = "espidf")]
pub const VERSION: &str = env!("VERSION_STRING");

/// Delayed input signal.
#[cfg(target_os = "espidf")]
const INPUT_PIN: i32 = 4;

/// Reproduced output signal.
#[cfg(target_os = "espidf")]
const OUTPUT_PIN: i32 = 5;

#[cfg(target_os = "espidf")]
static DELAY_LINE: DelayLine<GpioOutput, DEFAULT_CAPACITY> =
    DelayLine::new(GpioOutput::new(OUTPUT_PIN));

/// Both-edge ISR on the input pin. The edge polarity is recovered from the
/// level the pin settled at.
#[cfg(target_os = "espidf")]
extern "C" fn input_edge_isr(_arg: *mut c_void) {
    let now = hal::now_ms();
    if hal::gpio::input_level(INPUT_PIN) {
        DELAY_LINE.on_rising(now);
    } else {
        DELAY_LINE.on_falling(now);
    }
}

#[cfg(target_os = "espidf")]
#[no_mangle]
fn main() {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();

    hal::gpio::init_output(&OutputConfig {
        pin: OUTPUT_PIN,
        active_high: true,
    })
    .expect("output pin init failed");

    hal::gpio::attach_edge_isr(
        &InputConfig {
            pin: INPUT_PIN,
            pull_up: true,
        },
        input_edge_isr,
    )
    .expect("edge ISR install failed");

    let peripherals =
        esp_idf_svc::hal::peripherals::Peripherals::take().expect("peripherals already taken");
    let mut uart = serial::init_uart(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        &SerialConfig::default(),
    )
    .expect("uart init failed");

    let mut console = SerialConsole::new();

    isr_info!(
        LOG,
        hal::now_ms(),
        "{} ready, queue capacity {}",
        VERSION,
        DEFAULT_CAPACITY
    );

    // The dispatcher: poll due transitions, then service the serial link.
    // Never blocks, never sleeps; edge ISRs preempt at any point.
    loop {
        let now = hal::now_ms();
        DELAY_LINE.poll(now);
        console.service(&mut uart, &DELAY_LINE, now);
    }
}

//! Serial link: configuration channel in, diagnostics out.
//!
//! One UART carries both directions. Received bytes at or above `0x20` are
//! configuration commands (see [`crate::flags`]); each accepted byte is
//! acknowledged with a one-line human-readable status. The TX side drains
//! the global log ring and reports dropped records.
//!
//! Reads are zero-timeout — the serial service runs inside the main polling
//! loop and must never stall the dispatcher.

use crate::flags::DelayConfig;
use crate::logging::{write_args, LogRecord};

#[cfg(target_os = "espidf")]
use crate::engine::DelayLine;
#[cfg(target_os = "espidf")]
use crate::hal::OutputDrive;
#[cfg(target_os = "espidf")]
use crate::isr_warn;
#[cfg(target_os = "espidf")]
use crate::logging::LOG;
#[cfg(target_os = "espidf")]
use crate::signal::elapsed_ms;

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::delay::NON_BLOCK;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartDriver};

/// Upper bound for one formatted status or log line.
pub const LINE_MAX: usize = 160;

/// How often dropped-record counts are reported.
pub const DROP_REPORT_INTERVAL_MS: u32 = 10_000;

/// UART configuration for the serial link.
pub struct SerialConfig {
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { baud_rate: 115_200 }
    }
}

/// Format the acknowledgement line for an accepted configuration byte.
///
/// Returns the number of bytes written.
pub fn format_status(byte: u8, config: &DelayConfig, buf: &mut [u8]) -> usize {
    let state = if config.enabled { "enabled" } else { "disabled" };

    if config.has_delay {
        write_args(
            buf,
            format_args!(
                "cfg 0x{:02X}: {} delay {} ms\n",
                byte, state, config.latency_ms
            ),
        )
    } else {
        write_args(buf, format_args!("cfg 0x{:02X}: {} direct\n", byte, state))
    }
}

/// Format a log record for UART output.
///
/// Format: `[timestamp_ms] LEVEL: message\n`
pub fn format_record(record: &LogRecord, buf: &mut [u8]) -> usize {
    write_args(
        buf,
        format_args!(
            "[{:8}] {}: {}\n",
            record.timestamp_ms,
            record.level.as_str(),
            record.message()
        ),
    )
}

/// Initialize the UART for the serial link (RX config bytes, TX diagnostics).
#[cfg(target_os = "espidf")]
pub fn init_uart<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    rx_pin: impl Peripheral<P = impl gpio::InputPin> + 'd,
    config: &SerialConfig,
) -> Result<UartDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartDriver::new(
        uart,
        tx_pin,
        rx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// Serial service state: fault/drop accounting between loop iterations.
pub struct SerialConsole {
    last_fault_count: u32,
    last_drop_report_ms: u32,
}

impl SerialConsole {
    pub const fn new() -> Self {
        Self {
            last_fault_count: 0,
            last_drop_report_ms: 0,
        }
    }
}

impl Default for SerialConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl SerialConsole {
    /// Run one service pass: apply pending config bytes, surface new faults,
    /// drain the log ring. Called once per main-loop iteration; never blocks.
    pub fn service<O: OutputDrive, const N: usize>(
        &mut self,
        uart: &mut UartDriver<'_>,
        line: &DelayLine<O, N>,
        now_ms: u32,
    ) {
        let mut buf = [0u8; LINE_MAX];

        // Configuration bytes (zero-timeout read)
        let mut byte = [0u8; 1];
        while let Ok(n) = uart.read(&mut byte, NON_BLOCK) {
            if n == 0 {
                break;
            }
            if let Some(config) = line.configure(byte[0]) {
                let len = format_status(byte[0], &config, &mut buf);
                let _ = uart.write(&buf[..len]);
            }
        }

        // New queue overruns since last pass go through the ring like any
        // other diagnostic
        let faults = line.faults().snapshot();
        if faults.count != self.last_fault_count {
            isr_warn!(
                LOG,
                now_ms,
                "queue overrun: {} entries dropped, {} total",
                faults.data,
                faults.count
            );
            self.last_fault_count = faults.count;
        }

        // Drain diagnostics
        while let Some(record) = LOG.drain() {
            let len = format_record(&record, &mut buf);
            let _ = uart.write(&buf[..len]);
        }

        // Periodic dropped-record report
        if elapsed_ms(now_ms, self.last_drop_report_ms) >= DROP_REPORT_INTERVAL_MS {
            let dropped = LOG.dropped();
            if dropped > 0 {
                let len = write_args(
                    &mut buf,
                    format_args!("[WARN] log records dropped: {}\n", dropped),
                );
                let _ = uart.write(&buf[..len]);
                LOG.reset_dropped();
            }
            self.last_drop_report_ms = now_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, LogRing};

    #[test]
    fn test_format_status_delayed() {
        let config = DelayConfig {
            enabled: true,
            has_delay: true,
            latency_ms: 120,
        };

        // byte 0x46 -> flag 0x26: enabled, linear selector 6
        let mut buf = [0u8; LINE_MAX];
        let len = format_status(0x46, &config, &mut buf);

        let line = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(line, "cfg 0x46: enabled delay 120 ms\n");
    }

    #[test]
    fn test_format_status_direct() {
        let mut buf = [0u8; LINE_MAX];
        let len = format_status(0x20, &DelayConfig::DISABLED, &mut buf);

        let line = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(line, "cfg 0x20: disabled direct\n");
    }

    #[test]
    fn test_format_record() {
        let ring = LogRing::<4>::new();
        ring.push(1234567, LogLevel::Info, b"hello world");
        let record = ring.drain().unwrap();

        let mut buf = [0u8; LINE_MAX];
        let len = format_record(&record, &mut buf);

        let line = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(line.contains("1234567"));
        assert!(line.contains("INFO"));
        assert!(line.contains("hello world"));
    }
}

//! GPIO wiring for the delayed input/output pair.
//!
//! Raw `gpio_*` register calls rather than `PinDriver`: the output is driven
//! from interrupt context out of a `static`, so it must be const-constructible
//! and free of owned peripheral handles.

use crate::hal::OutputDrive;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys as esp_idf_sys;

/// Edge input pin configuration.
pub struct InputConfig {
    pub pin: i32,
    pub pull_up: bool,
}

/// Output pin configuration.
pub struct OutputConfig {
    pub pin: i32,
    pub active_high: bool,
}

/// Output capability backed by a raw GPIO level write.
pub struct GpioOutput {
    pin: i32,
    active_high: bool,
}

impl GpioOutput {
    /// Active-high output on `pin`.
    pub const fn new(pin: i32) -> Self {
        Self {
            pin,
            active_high: true,
        }
    }

    /// Active-low output on `pin` (asserted = line pulled low).
    pub const fn active_low(pin: i32) -> Self {
        Self {
            pin,
            active_high: false,
        }
    }

    #[cfg(target_os = "espidf")]
    #[inline]
    fn set(&self, high: bool) {
        unsafe {
            esp_idf_sys::gpio_set_level(self.pin, high as u32);
        }
    }
}

#[cfg(target_os = "espidf")]
impl OutputDrive for GpioOutput {
    #[inline]
    fn assert_output(&mut self) {
        self.set(self.active_high);
    }

    #[inline]
    fn deassert_output(&mut self) {
        self.set(!self.active_high);
    }
}

// Host builds have no GPIO registers; the no-op impl keeps the type
// constructible there.
#[cfg(not(target_os = "espidf"))]
impl OutputDrive for GpioOutput {
    fn assert_output(&mut self) {}
    fn deassert_output(&mut self) {}
}

/// Configure the output pin and park it deasserted.
#[cfg(target_os = "espidf")]
pub fn init_output(config: &OutputConfig) -> Result<(), esp_idf_sys::EspError> {
    unsafe {
        esp_idf_sys::esp!(esp_idf_sys::gpio_reset_pin(config.pin))?;
        esp_idf_sys::esp!(esp_idf_sys::gpio_set_direction(
            config.pin,
            esp_idf_sys::gpio_mode_t_GPIO_MODE_OUTPUT,
        ))?;
        esp_idf_sys::esp!(esp_idf_sys::gpio_set_level(
            config.pin,
            !config.active_high as u32,
        ))?;
    }
    Ok(())
}

/// Configure the input pin for both-edge interrupts and attach `handler`.
///
/// The ISR service dispatches per-pin; the handler samples the pin level to
/// tell rising from falling.
#[cfg(target_os = "espidf")]
pub fn attach_edge_isr(
    config: &InputConfig,
    handler: extern "C" fn(*mut core::ffi::c_void),
) -> Result<(), esp_idf_sys::EspError> {
    unsafe {
        esp_idf_sys::esp!(esp_idf_sys::gpio_reset_pin(config.pin))?;
        esp_idf_sys::esp!(esp_idf_sys::gpio_set_direction(
            config.pin,
            esp_idf_sys::gpio_mode_t_GPIO_MODE_INPUT,
        ))?;
        esp_idf_sys::esp!(esp_idf_sys::gpio_set_pull_mode(
            config.pin,
            if config.pull_up {
                esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY
            } else {
                esp_idf_sys::gpio_pull_mode_t_GPIO_FLOATING
            },
        ))?;
        esp_idf_sys::esp!(esp_idf_sys::gpio_set_intr_type(
            config.pin,
            esp_idf_sys::gpio_int_type_t_GPIO_INTR_ANYEDGE,
        ))?;

        // Idempotent across pins; INVALID_STATE just means already installed
        let err = esp_idf_sys::gpio_install_isr_service(0);
        if err != esp_idf_sys::ESP_OK && err != esp_idf_sys::ESP_ERR_INVALID_STATE {
            esp_idf_sys::esp!(err)?;
        }

        let isr: unsafe extern "C" fn(*mut core::ffi::c_void) = handler;
        esp_idf_sys::esp!(esp_idf_sys::gpio_isr_handler_add(
            config.pin,
            Some(isr),
            core::ptr::null_mut(),
        ))?;
    }
    Ok(())
}

/// Current input pin level (true = high). ISR-safe.
#[cfg(target_os = "espidf")]
#[inline]
pub fn input_level(pin: i32) -> bool {
    unsafe { esp_idf_sys::gpio_get_level(pin) != 0 }
}

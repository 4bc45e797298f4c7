//! Module: flags
//!
//! Purpose: Decode the host's 6-bit configuration flag into the delay line's
//! operating mode. Pure functions, total over all 64 flag values — there is
//! no malformed configuration.
//!
//! Flag layout:
//!
//! ```text
//! bit 5    ENABLE    output generation on/off
//! bit 4    FEXP      0 = linear latency scale, 1 = exponential scale
//! bit 3..0 DELAY     latency selector; 0 = direct pass-through
//! ```
//!
//! The serial protocol carries the flag as one printable byte: values
//! `0x20..=0x5F` map to flags `0x00..=0x3F` by subtracting `0x20`. Anything
//! below `0x20` is ignored.
//!
//! Safety: Safe. No unsafe blocks.

/// Output-generation enable bit.
pub const FLAG_ENABLE: u8 = 1 << 5;

/// Latency scale select: set = exponential, clear = linear.
pub const FLAG_EXP_SCALE: u8 = 1 << 4;

/// Latency selector nibble.
pub const DELAY_NIBBLE: u8 = 0x0F;

/// Valid flag bits.
pub const FLAG_MASK: u8 = 0x3F;

/// Linear-mode latency step: one selector count = 20 ms (20..300 ms range).
pub const DELAY_STEP_MS: u32 = 20;

/// First byte value that carries a configuration flag (ASCII space).
pub const CONFIG_BYTE_BASE: u8 = 0x20;

/// Decoded operating mode.
///
/// Replaced wholesale on every configuration change — never mutated
/// field-by-field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayConfig {
    /// Whether output generation is active at all.
    pub enabled: bool,
    /// Delayed mode vs. direct pass-through.
    pub has_delay: bool,
    /// Latency applied to every transition (0 in direct mode).
    pub latency_ms: u32,
}

impl DelayConfig {
    /// Power-on state: no output until the host says otherwise.
    pub const DISABLED: Self = Self {
        enabled: false,
        has_delay: false,
        latency_ms: 0,
    };

    /// Zero-latency pass-through mode.
    #[inline]
    pub fn is_direct(&self) -> bool {
        !self.has_delay
    }
}

/// Decode a 6-bit flag value. Total: every input produces a valid config.
pub fn decode_flags(flags: u8) -> DelayConfig {
    let flags = flags & FLAG_MASK;
    let enabled = flags & FLAG_ENABLE != 0;
    let selector = flags & DELAY_NIBBLE;

    // Selector 0 is direct mode regardless of the scale bit
    if selector == 0 {
        return DelayConfig {
            enabled,
            has_delay: false,
            latency_ms: 0,
        };
    }

    let latency_ms = if flags & FLAG_EXP_SCALE == 0 {
        DELAY_STEP_MS * selector as u32
    } else {
        exponential_latency_ms(selector)
    };

    DelayConfig {
        enabled,
        has_delay: true,
        latency_ms,
    }
}

/// Exponential-scale latency: bits 3..2 pick the decade, bits 1..0 the
/// multiplier.
///
/// The multiplier is the enumerated product `(bit1 ? 4 : 1) * (bit0 ? 2 : 1)`,
/// giving {1, 2, 4, 8}. This exact enumeration is part of the device's
/// calibrated latency table — do not fold it into a shift.
fn exponential_latency_ms(selector: u8) -> u32 {
    let decade = (selector >> 2) & 0x3;
    let mult = selector & 0x3;

    let scale = 10u32.pow(decade as u32);
    let fraction =
        (if mult & 0b10 != 0 { 4 } else { 1 }) * (if mult & 0b01 != 0 { 2 } else { 1 });

    scale * fraction
}

/// Extract the flag value from a received serial byte.
///
/// Returns `None` for bytes below the printable offset; those are ignored by
/// the protocol. The receive path constrains the result to 6 bits.
#[inline]
pub fn flag_from_byte(byte: u8) -> Option<u8> {
    if byte < CONFIG_BYTE_BASE {
        return None;
    }
    Some((byte - CONFIG_BYTE_BASE) & FLAG_MASK)
}

/// Decode a received serial byte directly to a configuration.
#[inline]
pub fn decode_byte(byte: u8) -> Option<DelayConfig> {
    flag_from_byte(byte).map(decode_flags)
}

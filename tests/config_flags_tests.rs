//! Configuration flag decoding tests: totality, both latency scales, and
//! the serial byte protocol.

use rust_gpio_delay_line::flags::{
    decode_byte, decode_flags, flag_from_byte, DelayConfig, DELAY_STEP_MS, FLAG_ENABLE,
    FLAG_EXP_SCALE,
};

#[test]
fn test_decode_is_total_and_deterministic() {
    for flags in 0u8..64 {
        let first = decode_flags(flags);
        let second = decode_flags(flags);
        assert_eq!(first, second, "flag 0x{:02X} not deterministic", flags);
    }
}

#[test]
fn test_high_bits_are_masked() {
    for flags in 0u8..64 {
        assert_eq!(decode_flags(flags), decode_flags(flags | 0xC0));
    }
}

#[test]
fn test_direct_mode_iff_zero_selector() {
    for flags in 0u8..64 {
        let config = decode_flags(flags);
        if flags & 0x0F == 0 {
            assert!(config.is_direct(), "flag 0x{:02X}", flags);
            assert_eq!(config.latency_ms, 0);
        } else {
            assert!(config.has_delay, "flag 0x{:02X}", flags);
            assert!(config.latency_ms > 0);
        }
    }
}

#[test]
fn test_enable_bit_is_orthogonal_to_latency() {
    for flags in 0u8..32 {
        let off = decode_flags(flags);
        let on = decode_flags(flags | FLAG_ENABLE);

        assert!(!off.enabled);
        assert!(on.enabled);
        assert_eq!(off.has_delay, on.has_delay);
        assert_eq!(off.latency_ms, on.latency_ms);
    }
}

#[test]
fn test_linear_scale_table() {
    // 20 ms steps, 20..300 ms
    for selector in 1u8..=15 {
        let config = decode_flags(FLAG_ENABLE | selector);
        assert_eq!(config.latency_ms, DELAY_STEP_MS * selector as u32);
    }
}

#[test]
fn test_exponential_scale_table() {
    // Decade from bits 3..2, enumerated multiplier {1,2,4,8} from bits 1..0
    let scales = [1u32, 10, 100, 1000];
    let multipliers = [1u32, 2, 4, 8];

    for decade in 0u8..=3 {
        for mult in 0u8..=3 {
            let selector = (decade << 2) | mult;
            if selector == 0 {
                continue; // direct mode, covered elsewhere
            }

            let config = decode_flags(FLAG_EXP_SCALE | selector);
            assert_eq!(
                config.latency_ms,
                scales[decade as usize] * multipliers[mult as usize],
                "decade {} mult {}",
                decade,
                mult
            );
        }
    }
}

#[test]
fn test_byte_protocol_offset() {
    // Below the printable offset: ignored
    for byte in 0u8..0x20 {
        assert_eq!(flag_from_byte(byte), None);
        assert_eq!(decode_byte(byte), None);
    }

    // Full mapped range
    assert_eq!(flag_from_byte(0x20), Some(0x00));
    assert_eq!(flag_from_byte(0x41), Some(0x21));
    assert_eq!(flag_from_byte(0x5F), Some(0x3F));
}

#[test]
fn test_byte_protocol_decodes() {
    // 0x20 -> flag 0x00: everything off
    assert_eq!(decode_byte(0x20), Some(DelayConfig::DISABLED));

    // 0x41 -> flag 0x21: enabled, linear selector 1
    let config = decode_byte(0x41).unwrap();
    assert!(config.enabled);
    assert_eq!(config.latency_ms, 20);

    // 0x5F -> flag 0x3F: enabled, exponential full scale
    let config = decode_byte(0x5F).unwrap();
    assert!(config.enabled);
    assert_eq!(config.latency_ms, 8000);
}

#[test]
fn test_bytes_above_range_wrap_into_flag_space() {
    // The receive path constrains flags to 6 bits; 0x60 aliases flag 0x00
    assert_eq!(flag_from_byte(0x60), Some(0x00));
    assert_eq!(decode_byte(0x60), Some(DelayConfig::DISABLED));
}

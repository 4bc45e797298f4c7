//! Engine behavior tests: operating modes, configuration swaps, and the
//! reference reconfiguration scenario.
//!
//! Host-run: a recording mock stands in for the output pin and tests feed
//! the engine a simulated millisecond clock.

use std::cell::RefCell;
use std::rc::Rc;

use rust_gpio_delay_line::{DelayConfig, DelayLine, OutputDrive};

/// Recording output pin: tracks the driven level and every transition.
#[derive(Clone, Default)]
struct MockPin {
    state: Rc<RefCell<PinState>>,
}

#[derive(Default)]
struct PinState {
    level: bool,
    transitions: Vec<bool>,
}

impl MockPin {
    fn level(&self) -> bool {
        self.state.borrow().level
    }

    fn transitions(&self) -> Vec<bool> {
        self.state.borrow().transitions.clone()
    }
}

impl OutputDrive for MockPin {
    fn assert_output(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.level {
            state.level = true;
            state.transitions.push(true);
        }
    }

    fn deassert_output(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.level {
            state.level = false;
            state.transitions.push(false);
        }
    }
}

fn delayed(latency_ms: u32) -> DelayConfig {
    DelayConfig {
        enabled: true,
        has_delay: true,
        latency_ms,
    }
}

const DIRECT: DelayConfig = DelayConfig {
    enabled: true,
    has_delay: false,
    latency_ms: 0,
};

#[test]
fn test_powers_up_disabled() {
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin.clone());

    line.on_rising(0);
    line.on_falling(5);
    line.poll(1000);

    assert!(!line.has_pending());
    assert!(pin.transitions().is_empty());
}

#[test]
fn test_disabled_mode_ignores_edges() {
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin.clone());

    // flag 0x01: latency selected but ENABLE clear
    line.configure(0x21).unwrap();

    line.on_rising(0);
    line.poll(500);

    assert!(!line.has_pending());
    assert!(pin.transitions().is_empty());
}

#[test]
fn test_direct_mode_mirrors_input() {
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin.clone());
    line.apply(DIRECT);

    line.on_rising(100);
    assert!(pin.level());
    assert!(!line.has_pending()); // no queue interaction

    line.on_falling(101);
    assert!(!pin.level());
    assert_eq!(pin.transitions(), vec![true, false]);
}

#[test]
fn test_delayed_mode_reproduces_after_latency() {
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin.clone());
    line.apply(delayed(50));

    line.on_rising(0);
    line.on_falling(10);
    assert!(line.has_pending());

    line.poll(49);
    assert!(!pin.level());

    line.poll(50);
    assert!(pin.level());

    line.poll(59);
    assert!(pin.level());

    line.poll(60);
    assert!(!pin.level());
    assert!(!line.has_pending());
    assert_eq!(pin.transitions(), vec![true, false]);
}

#[test]
fn test_reconfiguration_cancels_pending_schedule() {
    // Reference scenario: N=8, 50 ms latency. Rising at t=0 asserts at
    // t=50; falling at t=10 would deassert at t=60, but a disable byte at
    // t=55 forces the output down immediately and the t=60 event never
    // fires as a scheduled transition.
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin.clone());
    line.apply(delayed(50));

    line.on_rising(0);
    line.on_falling(10);

    line.poll(50);
    assert!(pin.level());

    // flag 0x00 at t=55: disabled, direct
    let config = line.configure(0x20).unwrap();
    assert_eq!(config, DelayConfig::DISABLED);
    assert!(!pin.level());
    assert!(!line.has_pending());

    line.poll(60);
    line.poll(100);
    assert_eq!(pin.transitions(), vec![true, false]);
}

#[test]
fn test_reapplying_same_config_resets_queue() {
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin.clone());

    // byte 0x41 -> flag 0x21: enabled, 20 ms
    line.configure(0x41).unwrap();
    line.on_rising(0);
    assert!(line.has_pending());

    line.configure(0x41).unwrap();
    assert!(!line.has_pending());
    assert!(!pin.level());

    // Engine still works after the reset
    line.on_rising(100);
    line.poll(120);
    assert!(pin.level());
}

#[test]
fn test_out_of_range_bytes_are_ignored() {
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin.clone());
    line.apply(delayed(30));
    line.on_rising(0);

    // Control bytes below 0x20 must not disturb the engine
    assert_eq!(line.configure(0x00), None);
    assert_eq!(line.configure(0x1F), None);

    assert_eq!(line.config(), delayed(30));
    assert!(line.has_pending());

    line.poll(30);
    assert!(pin.level());
}

#[test]
fn test_config_snapshot_matches_applied_byte() {
    let pin = MockPin::default();
    let line: DelayLine<MockPin, 8> = DelayLine::new(pin);

    let applied = line.configure(0x5F).unwrap();
    assert_eq!(line.config(), applied);
    assert!(applied.enabled);
    assert_eq!(applied.latency_ms, 8000);
}

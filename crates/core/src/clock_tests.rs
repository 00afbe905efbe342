// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_at_given_value() {
    let clock = FakeClock::new(1000);
    assert_eq!(clock.now(), 1000);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new(1000);
    clock.advance(30);
    assert_eq!(clock.now(), 1030);
}

#[test]
fn fake_clock_set_overrides() {
    let clock = FakeClock::new(1000);
    clock.set(50);
    assert_eq!(clock.now(), 50);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new(0);
    let other = clock.clone();
    other.advance(5);
    assert_eq!(clock.now(), 5);
}

#[test]
fn system_clock_is_plausible() {
    let clock = SystemClock;
    // Sometime after this spec was written.
    assert!(clock.now() > 1_700_000_000);
}

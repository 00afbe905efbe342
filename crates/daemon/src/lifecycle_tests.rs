// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn load_falls_back_to_defaults_when_env_is_unset() {
    std::env::remove_var("RESTARTER_CHECK_MIN_FREQUENCY_SECONDS");
    std::env::remove_var("RESTARTER_GC_EVERY_SECONDS");

    let config = Config::load().unwrap();
    assert_eq!(config.process.check_min_frequency_seconds, 5);
    assert_eq!(config.process.gc_every_seconds, 300);
}

#[test]
#[serial]
fn load_honors_process_wide_overrides() {
    std::env::set_var("RESTARTER_CHECK_MIN_FREQUENCY_SECONDS", "2");
    std::env::set_var("RESTARTER_GC_EVERY_SECONDS", "30");

    let config = Config::load().unwrap();
    assert_eq!(config.process.check_min_frequency_seconds, 2);
    assert_eq!(config.process.gc_every_seconds, 30);

    std::env::remove_var("RESTARTER_CHECK_MIN_FREQUENCY_SECONDS");
    std::env::remove_var("RESTARTER_GC_EVERY_SECONDS");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_single_policy() {
    let set = PolicySet::parse("unhealthy").unwrap();
    assert!(set.contains(Policy::Unhealthy));
    assert!(!set.contains(Policy::Dependency));
}

#[test]
fn parses_multiple_policies_any_order() {
    let a = PolicySet::parse("unhealthy,dependency").unwrap();
    let b = PolicySet::parse("dependency, unhealthy").unwrap();
    assert_eq!(a, b);
}

#[test]
fn dedups_repeated_policies() {
    let set = PolicySet::parse("unhealthy,unhealthy,dependency").unwrap();
    assert_eq!(set.iter().count(), 2);
}

#[test]
fn empty_string_yields_empty_set() {
    let set = PolicySet::parse("").unwrap();
    assert_eq!(set, PolicySet::empty());
}

#[test]
fn rejects_unknown_policy() {
    assert!(PolicySet::parse("bogus").is_err());
}

#[test]
fn display_matches_label_spelling() {
    assert_eq!(Policy::Unhealthy.to_string(), "unhealthy");
    assert_eq!(Policy::Dependency.to_string(), "dependency");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::worker::WorkerDeps;
use restarter_adapters::FakeRuntimeAdapter;
use restarter_core::{ContainerSettings, FakeClock, SettingsResolver};

fn registry() -> Arc<WorkerRegistry> {
    let (fatal_tx, _fatal_rx) = tokio::sync::mpsc::channel(8);
    let deps = Arc::new(WorkerDeps {
        runtime: Arc::new(FakeRuntimeAdapter::new()),
        settings: Arc::new(SettingsResolver::new(ContainerSettings::default(), 10)),
        clock: Arc::new(FakeClock::new(0)),
        fatal_tx,
    });
    Arc::new(WorkerRegistry::new(deps))
}

#[tokio::test]
async fn get_or_create_returns_same_worker_for_same_name() {
    let registry = registry();
    let a = registry.get_or_create(&ContainerName::new("web")).await;
    let b = registry.get_or_create(&ContainerName::new("web")).await;
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn get_or_create_creates_distinct_workers_for_distinct_names() {
    let registry = registry();
    let a = registry.get_or_create(&ContainerName::new("web")).await;
    let b = registry.get_or_create(&ContainerName::new("db")).await;
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len().await, 2);
}

#[tokio::test]
async fn gc_reaps_a_freshly_created_idle_worker() {
    let registry = registry();
    registry.get_or_create(&ContainerName::new("web")).await;
    assert_eq!(registry.len().await, 1);

    registry.gc_once().await;
    assert_eq!(registry.len().await, 0);
}

#[tokio::test]
async fn gc_does_not_reap_a_worker_with_a_pending_request() {
    let registry = registry();
    registry
        .request_restart(&ContainerName::new("web"), 0)
        .await;

    // The drain task hasn't had a chance to run on this single-threaded test
    // runtime yet, so the mailbox is still occupied.
    registry.gc_once().await;
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn push_status_creates_the_worker_if_absent() {
    let registry = registry();
    registry
        .push_status(&ContainerName::new("web"), "start")
        .await;
    assert_eq!(registry.len().await, 1);
}

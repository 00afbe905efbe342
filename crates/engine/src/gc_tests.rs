// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::worker::WorkerDeps;
use restarter_adapters::FakeRuntimeAdapter;
use restarter_core::{ContainerName, ContainerSettings, FakeClock, SettingsResolver};
use tokio::time::timeout;

fn registry() -> Arc<WorkerRegistry> {
    let (fatal_tx, _rx) = tokio::sync::mpsc::channel(8);
    Arc::new(WorkerRegistry::new(Arc::new(WorkerDeps {
        runtime: Arc::new(FakeRuntimeAdapter::new()),
        settings: Arc::new(SettingsResolver::new(ContainerSettings::default(), 10)),
        clock: Arc::new(FakeClock::new(0)),
        fatal_tx,
    })))
}

#[tokio::test]
async fn periodic_sweep_reaps_an_idle_worker() {
    let registry = registry();
    registry.get_or_create(&ContainerName::new("web")).await;
    assert_eq!(registry.len().await, 1);

    let gc = GarbageCollector::new(registry.clone(), Duration::from_millis(10));
    let task = tokio::spawn(gc.run());

    timeout(Duration::from_secs(1), async {
        while registry.len().await != 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    task.abort();
}

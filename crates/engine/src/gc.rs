// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodically reaps idle workers from the registry.

use crate::registry::WorkerRegistry;
use std::sync::Arc;
use tokio::time::Duration;

pub struct GarbageCollector {
    registry: Arc<WorkerRegistry>,
    interval: Duration,
}

impl GarbageCollector {
    pub fn new(registry: Arc<WorkerRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick fires immediately; that's fine, there's nothing to reap yet.
        loop {
            ticker.tick().await;
            self.registry.gc_once().await;
        }
    }
}

#[cfg(test)]
#[path = "gc_tests.rs"]
mod tests;

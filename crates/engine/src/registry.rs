// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The map from container name to worker, plus the GC sweep over it.
//!
//! Lookup-or-create takes the registry's read lock on the common path (many
//! producers enqueueing concurrently) and only escalates to the write lock to
//! insert a new entry. The GC always takes the write lock, so it serializes
//! against every producer and every other GC pass while it decides what to reap.

use crate::worker::{Worker, WorkerDeps};
use restarter_core::{ContainerName, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct WorkerRegistry {
    workers: RwLock<HashMap<ContainerName, Arc<Worker>>>,
    deps: Arc<WorkerDeps>,
}

impl WorkerRegistry {
    pub fn new(deps: Arc<WorkerDeps>) -> Self {
        Self {
            workers: RwLock::new(HashMap::new()),
            deps,
        }
    }

    pub async fn len(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Atomic lookup-or-create: a fast read-locked hit on the common path,
    /// escalating to the write lock only when the worker doesn't exist yet.
    pub async fn get_or_create(&self, name: &ContainerName) -> Arc<Worker> {
        if let Some(worker) = self.workers.read().await.get(name) {
            return worker.clone();
        }
        let mut workers = self.workers.write().await;
        workers
            .entry(name.clone())
            .or_insert_with(|| Worker::spawn(name.clone(), self.deps.clone()))
            .clone()
    }

    pub async fn request_restart(&self, name: &ContainerName, at: Timestamp) {
        self.get_or_create(name).await.request_restart(at).await;
    }

    pub async fn push_status(&self, name: &ContainerName, status: impl Into<String>) {
        self.get_or_create(name).await.push_status(status).await;
    }

    /// One GC sweep: registry write lock, then each worker's own lock in
    /// turn, reaping any worker whose mailbox is empty and whose last
    /// attempt has settled. See `worker.rs` for why this ordering is safe
    /// against a worker mid-drain.
    pub async fn gc_once(&self) {
        let mut workers = self.workers.write().await;
        let mut reaped = Vec::new();
        for (name, worker) in workers.iter() {
            let _worker_lock = worker.lock().await;
            if worker.mailbox_is_empty().await && worker.is_done() {
                worker.shutdown().await;
                reaped.push(name.clone());
            }
        }
        for name in &reaped {
            workers.remove(name);
        }
        if !reaped.is_empty() {
            tracing::info!(count = reaped.len(), "garbage collected idle workers");
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

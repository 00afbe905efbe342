// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-container worker: a serialized state machine that executes one
//! restart attempt at a time, with debouncing, retry bookkeeping, backoff,
//! and recreate-on-lost-parent.

use crate::error::{ActorFailure, ClassifiedFailure, FatalError};
use crate::signal::Signal;
use restarter_adapters::{derive_run_args, RunArgs, RuntimeAdapter, RuntimeError};
use restarter_core::{Clock, ContainerId, ContainerName, Specifier, SettingsResolver, Timestamp};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Duration;
use tracing::Instrument;

/// How often the drain loop polls the mailbox. Deliberately a poll, not a
/// blocking read: the GC must be able to observe `mailbox empty ∧ done set`
/// under the worker lock without racing a blocking reader.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
enum WorkerMessage {
    Request(Timestamp),
    Shutdown,
}

/// Shared dependencies every worker needs to execute a restart attempt.
pub struct WorkerDeps {
    pub runtime: Arc<dyn RuntimeAdapter>,
    pub settings: Arc<SettingsResolver>,
    pub clock: Arc<dyn Clock>,
    pub fatal_tx: tokio::sync::mpsc::Sender<ActorFailure>,
}

/// A single container's restart worker. Lives from first request until the
/// garbage collector observes it idle and reaps it.
pub struct Worker {
    pub name: ContainerName,
    mailbox: Signal<WorkerMessage>,
    /// Serializes mailbox-drain against GC inspection (see `gc.rs`).
    lock: AsyncMutex<()>,
    done: AtomicBool,
    restart_count: AtomicU32,
    recent_status: AsyncMutex<VecDeque<String>>,
}

impl Worker {
    fn new(name: ContainerName) -> Arc<Self> {
        Arc::new(Self {
            name,
            mailbox: Signal::new(),
            lock: AsyncMutex::new(()),
            done: AtomicBool::new(true),
            restart_count: AtomicU32::new(0),
            recent_status: AsyncMutex::new(VecDeque::with_capacity(2)),
        })
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count.load(Ordering::SeqCst)
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    pub async fn mailbox_is_empty(&self) -> bool {
        self.mailbox.is_empty().await
    }

    /// Acquire the worker's lock; used by the GC to inspect state atomically
    /// against a concurrent drain.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub async fn request_restart(&self, at: Timestamp) {
        self.mailbox.set(WorkerMessage::Request(at)).await;
    }

    pub async fn shutdown(&self) {
        self.mailbox.set(WorkerMessage::Shutdown).await;
    }

    pub async fn push_status(&self, status: impl Into<String>) {
        let mut ring = self.recent_status.lock().await;
        if ring.len() == 2 {
            ring.pop_front();
        }
        ring.push_back(status.into());
    }

    pub async fn recent_statuses(&self) -> Vec<String> {
        self.recent_status.lock().await.iter().cloned().collect()
    }

    /// Spawn the worker's drain task. Returns the handle immediately; the
    /// task runs detached until it receives the shutdown sentinel.
    pub fn spawn(name: ContainerName, deps: Arc<WorkerDeps>) -> Arc<Self> {
        let worker = Self::new(name);
        let task_worker = worker.clone();
        tokio::spawn(async move { task_worker.run(deps).await });
        worker
    }

    async fn run(self: Arc<Self>, deps: Arc<WorkerDeps>) {
        loop {
            let _guard = self.lock.lock().await;
            let message = self.mailbox.try_get().await;
            match message {
                None => {
                    drop(_guard);
                    tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
                    continue;
                }
                Some(WorkerMessage::Shutdown) => {
                    self.done.store(true, Ordering::SeqCst);
                    return;
                }
                Some(WorkerMessage::Request(at)) => {
                    self.done.store(false, Ordering::SeqCst);
                    drop(_guard);
                    self.attempt_restart(&deps, at).await;
                    self.done.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    async fn attempt_restart(&self, deps: &WorkerDeps, requested_at: Timestamp) {
        async {
            match self.try_restart(deps, requested_at).await {
                Ok(()) => tracing::info!("restart attempt completed"),
                Err(failure) => {
                    tracing::info!(reason = %failure, "restart attempt classified, not retried")
                }
            }
        }
        .instrument(tracing::info_span!("worker.restart", container = %self.name))
        .await
    }

    async fn try_restart(
        &self,
        deps: &WorkerDeps,
        requested_at: Timestamp,
    ) -> Result<(), ClassifiedFailure> {
        let container = match deps.runtime.inspect(self.name.as_str()).await {
            Ok(c) => c,
            Err(RuntimeError::NotFound(_)) => {
                return Err(ClassifiedFailure::ContainerGone(self.name.to_string()))
            }
            Err(other) => {
                self.report_fatal(deps, other).await;
                return Err(ClassifiedFailure::ContainerGone(self.name.to_string()));
            }
        };

        if container.started_at > requested_at {
            return Err(ClassifiedFailure::AlreadyRestarted);
        }

        let settings = deps.settings.resolve(&container);
        let attempt = self.restart_count.fetch_add(1, Ordering::SeqCst) + 1;
        if settings.max_retries.exceeded_by(attempt) {
            return Err(ClassifiedFailure::MaxRetriesReached(attempt));
        }

        let delay = settings.backoff.delay_seconds(
            settings.seconds_between_retries,
            attempt,
            settings.backoff_max_seconds,
        );
        let now = deps.clock.now();
        let ready_at = container.started_at.saturating_add(delay);
        if ready_at > now {
            tokio::time::sleep(Duration::from_secs(ready_at - now)).await;
        }

        match container.network_mode.shared_parent() {
            None => {
                deps.runtime
                    .restart(&container)
                    .await
                    .map_err(|e| ClassifiedFailure::RestartFailed(e.to_string()))
            }
            Some(parent_id) => self.restart_or_recreate(deps, &container, parent_id).await,
        }
    }

    async fn restart_or_recreate(
        &self,
        deps: &WorkerDeps,
        container: &restarter_core::Container,
        parent_id: &ContainerId,
    ) -> Result<(), ClassifiedFailure> {
        match deps.runtime.inspect(parent_id.as_str()).await {
            Ok(_) => deps
                .runtime
                .restart(container)
                .await
                .map_err(|e| ClassifiedFailure::RestartFailed(e.to_string())),
            Err(RuntimeError::NotFound(_)) => self.recreate(deps, container).await,
            Err(other) => {
                self.report_fatal(deps, other).await;
                Err(ClassifiedFailure::ContainerGone(self.name.to_string()))
            }
        }
    }

    async fn recreate(
        &self,
        deps: &WorkerDeps,
        container: &restarter_core::Container,
    ) -> Result<(), ClassifiedFailure> {
        let settings = deps.settings.resolve(container);
        let target = settings
            .network_mode
            .clone()
            .ok_or(ClassifiedFailure::NetworkModeMissing)?;

        let inventory = match deps.runtime.list_all().await {
            Ok(inventory) => inventory,
            Err(e) => {
                self.report_fatal(deps, e).await;
                return Err(ClassifiedFailure::ContainerGone(self.name.to_string()));
            }
        };

        let new_parent = resolve_specifier(&target, container, &inventory)
            .ok_or_else(|| ClassifiedFailure::UnresolvedSpecifier(format!("{target:?}")))?;

        let image = deps.runtime.inspect_image(&container.image).await.ok();
        let args = derive_run_args(container, image.as_ref(), Some(new_parent.id.as_str()));

        if let Err(e) = deps.runtime.remove(container, true).await {
            self.report_fatal(deps, e).await;
            return Err(ClassifiedFailure::ContainerGone(self.name.to_string()));
        }

        match deps.runtime.run(args).await {
            Ok(_) => Ok(()),
            Err(RuntimeError::NameConflict(msg)) => Err(ClassifiedFailure::NameConflictOnRun(msg)),
            Err(other) => {
                self.report_fatal(deps, other).await;
                Err(ClassifiedFailure::ContainerGone(self.name.to_string()))
            }
        }
    }

    async fn report_fatal(&self, deps: &WorkerDeps, err: RuntimeError) {
        let failure = ActorFailure::new("worker", FatalError::Runtime(err));
        let _ = deps.fatal_tx.send(failure).await;
    }
}

/// Resolve a `network_mode` specifier against a freshly listed inventory, the
/// way the recreate path must (it cannot rely on the evaluator's stale
/// per-pass indexes).
fn resolve_specifier<'a>(
    specifier: &Specifier,
    depender: &restarter_core::Container,
    inventory: &'a [restarter_core::Container],
) -> Option<&'a restarter_core::Container> {
    let by_id: HashMap<_, _> = inventory.iter().map(|c| (c.id.clone(), c)).collect();
    let by_name: HashMap<_, _> = inventory.iter().map(|c| (c.name.clone(), c)).collect();
    let by_service: HashMap<String, &restarter_core::Container> = inventory
        .iter()
        .filter_map(|c| c.compose_service().map(|s| (s.to_string(), c)))
        .collect();

    specifier.resolve_fresh(depender.compose_service().is_some(), &by_id, &by_name, &by_service)
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;

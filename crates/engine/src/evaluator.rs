// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The poller: one pass over every container, deciding who needs restarting.

use crate::error::{ActorFailure, FatalError};
use crate::registry::WorkerRegistry;
use crate::signal::Signal;
use restarter_adapters::RuntimeAdapter;
use restarter_core::{Clock, Container, ContainerId, ContainerName, Policy, SettingsResolver};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::Instrument;

pub struct Evaluator {
    runtime: Arc<dyn RuntimeAdapter>,
    settings: Arc<SettingsResolver>,
    clock: Arc<dyn Clock>,
    registry: Arc<WorkerRegistry>,
    trigger: Arc<Signal<()>>,
    check_min_frequency: Duration,
    check_max_frequency: Duration,
    fatal_tx: mpsc::Sender<ActorFailure>,
}

impl Evaluator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        runtime: Arc<dyn RuntimeAdapter>,
        settings: Arc<SettingsResolver>,
        clock: Arc<dyn Clock>,
        registry: Arc<WorkerRegistry>,
        trigger: Arc<Signal<()>>,
        check_min_frequency: Duration,
        check_max_frequency: Duration,
        fatal_tx: mpsc::Sender<ActorFailure>,
    ) -> Self {
        Self {
            runtime,
            settings,
            clock,
            registry,
            trigger,
            check_min_frequency,
            check_max_frequency,
            fatal_tx,
        }
    }

    /// Runs forever: wait on the trigger, evaluate one pass, enforce a
    /// minimum spacing between passes. A sibling task re-trips the trigger
    /// every `check_max_frequency` so the daemon still makes progress when
    /// no event ever arrives.
    pub async fn run(self: Arc<Self>) {
        let _ticker = {
            let trigger = self.trigger.clone();
            let period = self.check_max_frequency;
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(period).await;
                    trigger.set(()).await;
                }
            })
        };

        loop {
            self.trigger.get().await;
            self.run_pass().await;
            tokio::time::sleep(self.check_min_frequency).await;
        }
    }

    async fn run_pass(&self) {
        let containers = match self.runtime.list_all().await {
            Ok(containers) => containers,
            Err(e) => {
                let _ = self
                    .fatal_tx
                    .send(ActorFailure::new("evaluator", FatalError::Runtime(e)))
                    .await;
                return;
            }
        };

        let restart_set = self.compute_restart_set(&containers);
        let now = self.clock.now();
        let container_count = containers.len();
        let restart_count = restart_set.len();

        async {
            tracing::info!("evaluator pass complete");
            for name in &restart_set {
                self.registry.request_restart(name, now).await;
            }
        }
        .instrument(tracing::info_span!(
            "evaluator.pass",
            containers = container_count,
            restart_set = restart_count
        ))
        .await;
    }

    /// Pure decision logic for one pass, kept separate from I/O and tracing
    /// so it's simple to exercise directly in tests.
    fn compute_restart_set(&self, containers: &[Container]) -> HashSet<ContainerName> {
        let by_id: HashMap<ContainerId, &Container> =
            containers.iter().map(|c| (c.id.clone(), c)).collect();
        let by_name: HashMap<ContainerName, &Container> =
            containers.iter().map(|c| (c.name.clone(), c)).collect();
        let mut by_service: HashMap<String, &Container> = HashMap::new();
        for c in containers {
            if let Some(service) = c.compose_service() {
                // Ties aren't specified; last one listed wins.
                by_service.insert(service.to_string(), c);
            }
        }

        let mut restart_set = HashSet::new();

        for container in containers {
            let settings = self.settings.resolve(container);
            if !settings.enable {
                continue;
            }

            if settings.policy.contains(Policy::Unhealthy) && container.health.is_unhealthy() {
                restart_set.insert(container.name.clone());
            }

            if !settings.policy.contains(Policy::Dependency) {
                continue;
            }

            let mut dependencies: HashMap<ContainerId, &Container> = HashMap::new();

            if let Some(parent_id) = container.network_mode.shared_parent() {
                if let Some(parent) = by_id.get(parent_id) {
                    dependencies.insert(parent.id.clone(), parent);
                }
            }

            for service in container.compose_depends_on() {
                if let Some(dep) = by_service.get(service) {
                    dependencies.insert(dep.id.clone(), dep);
                }
            }

            for specifier in settings.depends_on.iter().chain(settings.network_mode.iter()) {
                if let Some(dep) = specifier.resolve(container, &by_name, &by_service) {
                    dependencies.insert(dep.id.clone(), dep);
                }
            }

            for dep in dependencies.values() {
                if dep.health.is_unhealthy() || !dep.status.is_running() {
                    restart_set.insert(dep.name.clone());
                } else if container.started_at <= dep.started_at {
                    restart_set.insert(container.name.clone());
                }
            }
        }

        restart_set
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;

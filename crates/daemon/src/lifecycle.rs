// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: config, adapter construction, and wiring the evaluator,
//! event handler, and GC as independent tasks sharing a fatal-error channel.

use std::sync::Arc;
use std::time::Duration;

use restarter_adapters::{DockerAdapter, RuntimeAdapter, RuntimeError, TracedRuntime};
use restarter_core::{Clock, ProcessSettings, SettingsResolver, SystemClock};
use restarter_engine::{ActorFailure, Evaluator, EventHandler, GarbageCollector, Signal, WorkerDeps, WorkerRegistry};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How many in-flight fatal reports the channel can buffer before a sender
/// blocks. One actor failing is already fatal; this only needs headroom for
/// a burst of simultaneous failures at shutdown.
const FATAL_CHANNEL_CAPACITY: usize = 8;

/// Bound on the settings-resolver's per-container memoization cache.
const SETTINGS_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
pub struct Config {
    pub process: ProcessSettings,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to connect to the container runtime: {0}")]
    Runtime(#[from] RuntimeError),
}

impl Config {
    /// Load configuration from the environment, falling back to built-in
    /// defaults for anything unset or unparseable.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self {
            process: ProcessSettings::from_env(),
        })
    }
}

/// Everything `main` needs after a successful startup: the registry (kept
/// around so its size can be reported if ever useful) and the fatal-error
/// channel to select on, plus the handles of the tasks doing the work.
pub struct Supervisor {
    pub registry: Arc<WorkerRegistry>,
    pub fatal_rx: mpsc::Receiver<ActorFailure>,
    _tasks: Vec<JoinHandle<()>>,
}

/// Construct the runtime adapter, wire the evaluator/event handler/GC as
/// tokio tasks, and return the shared fatal-error channel for `main` to
/// select on.
pub async fn startup(config: &Config) -> Result<Supervisor, LifecycleError> {
    let adapter = DockerAdapter::connect()?;
    let runtime: Arc<dyn RuntimeAdapter> = Arc::new(TracedRuntime::new(adapter));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = Arc::new(SettingsResolver::new(
        config.process.container_defaults.clone(),
        SETTINGS_CACHE_CAPACITY,
    ));

    let (fatal_tx, fatal_rx) = mpsc::channel(FATAL_CHANNEL_CAPACITY);

    let deps = Arc::new(WorkerDeps {
        runtime: runtime.clone(),
        settings: settings.clone(),
        clock: clock.clone(),
        fatal_tx: fatal_tx.clone(),
    });
    let registry = Arc::new(WorkerRegistry::new(deps));
    let trigger = Arc::new(Signal::new());

    let evaluator = Arc::new(Evaluator::new(
        runtime.clone(),
        settings,
        clock,
        registry.clone(),
        trigger.clone(),
        Duration::from_secs(config.process.check_min_frequency_seconds),
        Duration::from_secs(config.process.check_max_frequency_seconds),
        fatal_tx.clone(),
    ));
    let event_handler = EventHandler::new(runtime, registry.clone(), trigger, fatal_tx);
    let gc = GarbageCollector::new(
        registry.clone(),
        Duration::from_secs(config.process.gc_every_seconds),
    );

    let tasks = vec![
        tokio::spawn(async move { evaluator.run().await }),
        tokio::spawn(event_handler.run()),
        tokio::spawn(gc.run()),
    ];

    Ok(Supervisor {
        registry,
        fatal_rx,
        _tasks: tasks,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`RuntimeAdapter`] for exercising the engine without a live
//! container runtime. Seedable with containers, can be told to fail specific
//! operations, and records every call it receives.

use super::{EventStream, ImageConfig, RunArgs, RuntimeAdapter, RuntimeError};
use async_trait::async_trait;
use parking_lot::Mutex;
use restarter_core::{Container, ContainerId, ContainerName};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    ListAll,
    Inspect(String),
    Restart(String),
    Remove(String),
    Run(String),
    InspectImage(String),
}

#[derive(Default)]
struct State {
    containers: HashMap<ContainerId, Container>,
    images: HashMap<String, ImageConfig>,
    calls: Vec<FakeCall>,
    fail_restart: HashMap<ContainerId, RuntimeError>,
    fail_run: HashMap<String, RuntimeError>,
    fail_events: Option<RuntimeError>,
    event_tx: Option<mpsc::UnboundedSender<super::RuntimeEvent>>,
    next_container_id: u64,
}

/// An in-memory runtime adapter driven entirely by test setup, no I/O.
#[derive(Clone, Default)]
pub struct FakeRuntimeAdapter {
    state: Arc<Mutex<State>>,
}

impl FakeRuntimeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, container: Container) {
        self.state.lock().containers.insert(container.id.clone(), container);
    }

    pub fn seed_image(&self, image: &str, config: ImageConfig) {
        self.state.lock().images.insert(image.to_string(), config);
    }

    pub fn fail_restart(&self, id: &ContainerId, err: RuntimeError) {
        self.state.lock().fail_restart.insert(id.clone(), err);
    }

    pub fn fail_run(&self, name: &str, err: RuntimeError) {
        self.state.lock().fail_run.insert(name.to_string(), err);
    }

    pub fn fail_events(&self, err: RuntimeError) {
        self.state.lock().fail_events = Some(err);
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Push a synthetic event to whatever `events()` stream has been opened.
    pub fn push_event(&self, event: super::RuntimeEvent) {
        if let Some(tx) = &self.state.lock().event_tx {
            let _ = tx.send(event);
        }
    }

    /// Drop the sender side of an open `events()` stream, simulating the
    /// runtime closing the connection.
    pub fn close_events(&self) {
        self.state.lock().event_tx = None;
    }

    pub fn container(&self, id: &ContainerId) -> Option<Container> {
        self.state.lock().containers.get(id).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<Container> {
        self.state
            .lock()
            .containers
            .values()
            .find(|c| c.name.as_str() == name)
            .cloned()
    }
}

#[async_trait]
impl RuntimeAdapter for FakeRuntimeAdapter {
    async fn list_all(&self) -> Result<Vec<Container>, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(FakeCall::ListAll);
        Ok(state.containers.values().cloned().collect())
    }

    async fn inspect(&self, id_or_name: &str) -> Result<Container, RuntimeError> {
        self.state.lock().calls.push(FakeCall::Inspect(id_or_name.to_string()));
        if let Some(c) = self.state.lock().containers.get(&ContainerId::new(id_or_name)).cloned() {
            return Ok(c);
        }
        self.find_by_name(id_or_name)
            .ok_or_else(|| RuntimeError::NotFound(id_or_name.to_string()))
    }

    async fn events(&self) -> Result<EventStream, RuntimeError> {
        if let Some(err) = &self.state.lock().fail_events {
            return Err(clone_err(err));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().event_tx = Some(tx);
        let stream = UnboundedReceiverStream::new(rx).map(Ok);
        Ok(Box::pin(stream))
    }

    async fn restart(&self, container: &Container) -> Result<(), RuntimeError> {
        self.state.lock().calls.push(FakeCall::Restart(container.id.as_str().to_string()));
        if let Some(err) = self.state.lock().fail_restart.get(&container.id) {
            return Err(clone_err(err));
        }
        let mut state = self.state.lock();
        if let Some(c) = state.containers.get_mut(&container.id) {
            c.started_at += 1;
        }
        Ok(())
    }

    async fn remove(&self, container: &Container, _force: bool) -> Result<(), RuntimeError> {
        self.state.lock().calls.push(FakeCall::Remove(container.id.as_str().to_string()));
        self.state.lock().containers.remove(&container.id);
        Ok(())
    }

    async fn run(&self, args: RunArgs) -> Result<Container, RuntimeError> {
        self.state.lock().calls.push(FakeCall::Run(args.name.clone()));
        if let Some(err) = self.state.lock().fail_run.get(&args.name) {
            return Err(clone_err(err));
        }

        let mut state = self.state.lock();
        state.next_container_id += 1;
        let new_id = ContainerId::new(format!("fake-{}", state.next_container_id));

        let container = Container {
            id: new_id.clone(),
            name: ContainerName::new(args.name.clone()),
            labels: args.labels,
            status: restarter_core::RunStatus::Running,
            health: restarter_core::HealthStatus::Unknown,
            started_at: 0,
            network_mode: restarter_core::NetworkMode::parse(&args.network_mode),
            image: args.image,
            env: args.env,
            entrypoint: args.entrypoint,
            cmd: args.cmd,
            working_dir: args.working_dir,
            binds: args.binds,
            hostname: args.hostname.unwrap_or_default(),
            raw: serde_json::Value::Null,
        };
        state.containers.insert(new_id, container.clone());
        Ok(container)
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageConfig, RuntimeError> {
        self.state.lock().calls.push(FakeCall::InspectImage(image.to_string()));
        Ok(self.state.lock().images.get(image).cloned().unwrap_or_default())
    }
}

fn clone_err(err: &RuntimeError) -> RuntimeError {
    match err {
        RuntimeError::NotFound(s) => RuntimeError::NotFound(s.clone()),
        RuntimeError::NameConflict(s) => RuntimeError::NameConflict(s.clone()),
        RuntimeError::Other(s) => RuntimeError::Other(s.clone()),
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

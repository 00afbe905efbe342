// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker Engine API implementation of [`RuntimeAdapter`], via `bollard`.

use super::{EventStream, ImageConfig, RunArgs, RuntimeAdapter, RuntimeError, RuntimeEvent};
use async_trait::async_trait;
use bollard::container::{
    Config as BollardContainerConfig, CreateContainerOptions, InspectContainerOptions,
    ListContainersOptions, RemoveContainerOptions, RestartContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerInspectResponse, ContainerStateStatusEnum, HealthStatusEnum};
use bollard::system::EventsOptions;
use bollard::Docker;
use restarter_core::{Container, ContainerId, ContainerName, HealthStatus, NetworkMode, RunStatus};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use tokio_stream::StreamExt;

/// Delay between `list_all` retries after a transient `not found`.
const LIST_RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct DockerAdapter {
    client: Docker,
}

impl DockerAdapter {
    /// Connect using the runtime's conventional environment (`DOCKER_HOST`,
    /// falling back to the local Unix socket).
    pub fn connect() -> Result<Self, RuntimeError> {
        let client = Docker::connect_with_local_defaults().map_err(map_err)?;
        Ok(Self { client })
    }
}

fn map_err(err: BollardError) -> RuntimeError {
    match &err {
        BollardError::DockerResponseServerError { status_code, message } => match *status_code {
            404 => RuntimeError::NotFound(message.clone()),
            409 => RuntimeError::NameConflict(message.clone()),
            _ => RuntimeError::Other(err.to_string()),
        },
        _ => RuntimeError::Other(err.to_string()),
    }
}

fn parse_started_at(raw: &str) -> u64 {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp().max(0) as u64)
        .unwrap_or(0)
}

fn labels_from(raw: Option<HashMap<String, String>>) -> BTreeMap<String, String> {
    raw.unwrap_or_default().into_iter().collect()
}

fn to_container(resp: ContainerInspectResponse) -> Result<Container, RuntimeError> {
    let id = resp
        .id
        .clone()
        .ok_or_else(|| RuntimeError::Other("inspect response missing id".into()))?;
    let name = resp
        .name
        .clone()
        .map(|n| n.trim_start_matches('/').to_string())
        .ok_or_else(|| RuntimeError::Other("inspect response missing name".into()))?;

    let config = resp.config.clone().unwrap_or_default();
    let state = resp.state.clone().unwrap_or_default();
    let host_config = resp.host_config.clone().unwrap_or_default();

    let status = match state.status {
        Some(ContainerStateStatusEnum::RUNNING) => RunStatus::Running,
        Some(ContainerStateStatusEnum::EXITED) => RunStatus::Exited,
        Some(ContainerStateStatusEnum::CREATED) => RunStatus::Created,
        Some(ContainerStateStatusEnum::RESTARTING) => RunStatus::Restarting,
        Some(ContainerStateStatusEnum::PAUSED) => RunStatus::Paused,
        Some(ContainerStateStatusEnum::DEAD) => RunStatus::Dead,
        _ => RunStatus::Other,
    };

    let health = state
        .health
        .as_ref()
        .and_then(|h| h.status)
        .map(|s| match s {
            HealthStatusEnum::HEALTHY => HealthStatus::Healthy,
            HealthStatusEnum::UNHEALTHY => HealthStatus::Unhealthy,
            HealthStatusEnum::STARTING => HealthStatus::Starting,
            _ => HealthStatus::Unknown,
        })
        .unwrap_or_default();

    let started_at = state.started_at.as_deref().map(parse_started_at).unwrap_or(0);
    let network_mode = NetworkMode::parse(host_config.network_mode.as_deref().unwrap_or("default"));

    Ok(Container {
        id: ContainerId::new(id),
        name: ContainerName::new(name),
        labels: labels_from(config.labels),
        status,
        health,
        started_at,
        network_mode,
        image: config.image.unwrap_or_default(),
        env: config.env.unwrap_or_default(),
        entrypoint: config.entrypoint,
        cmd: config.cmd,
        working_dir: config.working_dir,
        binds: host_config.binds.unwrap_or_default(),
        hostname: config.hostname.unwrap_or_default(),
        raw: serde_json::to_value(&resp).unwrap_or(serde_json::Value::Null),
    })
}

#[async_trait]
impl RuntimeAdapter for DockerAdapter {
    async fn list_all(&self) -> Result<Vec<Container>, RuntimeError> {
        loop {
            let summaries = self
                .client
                .list_containers(Some(ListContainersOptions::<String> {
                    all: true,
                    ..Default::default()
                }))
                .await;

            let summaries = match summaries {
                Ok(s) => s,
                Err(e) => {
                    let mapped = map_err(e);
                    if mapped.is_not_found() {
                        tracing::warn!("transient not-found listing containers, retrying");
                        tokio::time::sleep(LIST_RETRY_DELAY).await;
                        continue;
                    }
                    return Err(mapped);
                }
            };

            let mut containers = Vec::with_capacity(summaries.len());
            for summary in summaries {
                let Some(id) = summary.id else { continue };
                match self.inspect(&id).await {
                    Ok(c) => containers.push(c),
                    Err(e) if e.is_not_found() => continue, // removed between list and inspect
                    Err(e) => return Err(e),
                }
            }
            return Ok(containers);
        }
    }

    async fn inspect(&self, id_or_name: &str) -> Result<Container, RuntimeError> {
        let resp = self
            .client
            .inspect_container(id_or_name, None::<InspectContainerOptions>)
            .await
            .map_err(map_err)?;
        to_container(resp)
    }

    async fn events(&self) -> Result<EventStream, RuntimeError> {
        let mut filters = HashMap::new();
        filters.insert("type".to_string(), vec!["container".to_string()]);
        let stream = self.client.events(Some(EventsOptions::<String> {
            since: None,
            until: None,
            filters,
        }));

        let mapped = stream.map(|item| {
            let event = item.map_err(map_err)?;
            let actor = event.actor.unwrap_or_default();
            let id = actor.id.unwrap_or_default();
            let name = actor
                .attributes
                .unwrap_or_default()
                .get("name")
                .cloned()
                .unwrap_or_default();
            Ok(RuntimeEvent {
                status: event.action.unwrap_or_default(),
                id: ContainerId::new(id),
                name,
            })
        });

        Ok(Box::pin(mapped))
    }

    async fn restart(&self, container: &Container) -> Result<(), RuntimeError> {
        self.client
            .restart_container(container.id.as_str(), None::<RestartContainerOptions>)
            .await
            .map_err(map_err)
    }

    async fn remove(&self, container: &Container, force: bool) -> Result<(), RuntimeError> {
        self.client
            .remove_container(
                container.id.as_str(),
                Some(RemoveContainerOptions {
                    force,
                    ..Default::default()
                }),
            )
            .await
            .map_err(map_err)
    }

    async fn run(&self, args: RunArgs) -> Result<Container, RuntimeError> {
        let host_config = bollard::models::HostConfig {
            network_mode: Some(args.network_mode.clone()),
            binds: Some(args.binds.clone()),
            ..Default::default()
        };

        let config = BollardContainerConfig {
            image: Some(args.image.clone()),
            env: Some(args.env.clone()),
            entrypoint: args.entrypoint.clone(),
            cmd: args.cmd.clone(),
            working_dir: args.working_dir.clone(),
            labels: Some(args.labels.clone().into_iter().collect()),
            hostname: args.hostname.clone(),
            host_config: Some(host_config),
            ..Default::default()
        };

        let created = self
            .client
            .create_container(
                Some(CreateContainerOptions {
                    name: args.name.clone(),
                    platform: None,
                }),
                config,
            )
            .await
            .map_err(map_err)?;

        self.client
            .start_container::<String>(&created.id, None)
            .await
            .map_err(map_err)?;

        self.inspect(&created.id).await
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageConfig, RuntimeError> {
        let resp = self
            .client
            .inspect_image(image)
            .await
            .map_err(map_err)?;
        let config = resp.config.unwrap_or_default();
        let volumes = config
            .volumes
            .unwrap_or_default()
            .into_keys()
            .collect::<BTreeSet<_>>();

        Ok(ImageConfig {
            env: config.env.unwrap_or_default(),
            entrypoint: config.entrypoint,
            cmd: config.cmd,
            working_dir: config.working_dir,
            labels: labels_from(config.labels),
            volumes,
        })
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;

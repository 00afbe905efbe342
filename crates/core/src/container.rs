// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The read-only container snapshot the evaluator and workers reason about.

use crate::id::{ContainerId, ContainerName};
use std::collections::BTreeMap;

/// Compose label naming the service a container belongs to.
pub const LABEL_COMPOSE_SERVICE: &str = "com.docker.compose.service";
/// Compose label listing `service:condition` pairs a container depends on.
pub const LABEL_COMPOSE_DEPENDS_ON: &str = "com.docker.compose.depends_on";

/// Run state of a container as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Exited,
    Created,
    Restarting,
    Paused,
    Dead,
    Other,
}

impl RunStatus {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "running" => RunStatus::Running,
            "exited" => RunStatus::Exited,
            "created" => RunStatus::Created,
            "restarting" => RunStatus::Restarting,
            "paused" => RunStatus::Paused,
            "dead" => RunStatus::Dead,
            _ => RunStatus::Other,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }
}

/// Health-check status as reported by the runtime. `Unknown` covers both "no
/// health check configured" and "check has not reported yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Starting,
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "starting" => HealthStatus::Starting,
            "healthy" => HealthStatus::Healthy,
            "unhealthy" => HealthStatus::Unhealthy,
            _ => HealthStatus::Unknown,
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy)
    }
}

/// Target of a container's network namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkMode {
    /// Shares another container's network namespace.
    Container(ContainerId),
    /// Any other mode (`bridge`, `host`, a named network, …); opaque to us.
    Other(String),
}

impl NetworkMode {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("container:") {
            Some(id) => NetworkMode::Container(ContainerId::new(id)),
            None => NetworkMode::Other(raw.to_string()),
        }
    }

    pub fn shared_parent(&self) -> Option<&ContainerId> {
        match self {
            NetworkMode::Container(id) => Some(id),
            NetworkMode::Other(_) => None,
        }
    }
}

/// A point-in-time view of one container, as returned by `inspect` or `list_all`.
///
/// Fields beyond identity and state exist mainly to feed the recreate path
/// (`derive_run_args`); most evaluator logic only touches `status`, `health`,
/// `started_at`, and `network_mode`.
#[derive(Debug, Clone)]
pub struct Container {
    pub id: ContainerId,
    pub name: ContainerName,
    pub labels: BTreeMap<String, String>,
    pub status: RunStatus,
    pub health: HealthStatus,
    /// Seconds since the Unix epoch the container was last (re)started.
    pub started_at: u64,
    pub network_mode: NetworkMode,
    pub image: String,
    pub env: Vec<String>,
    pub entrypoint: Option<Vec<String>>,
    pub cmd: Option<Vec<String>>,
    pub working_dir: Option<String>,
    pub binds: Vec<String>,
    pub hostname: String,
    /// Full inspect payload, kept for fields this model doesn't name explicitly.
    pub raw: serde_json::Value,
}

impl Container {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn compose_service(&self) -> Option<&str> {
        self.label(LABEL_COMPOSE_SERVICE)
    }

    /// Parsed `service:condition[,service:condition...]` targets from the
    /// compose `depends_on` label.
    pub fn compose_depends_on(&self) -> Vec<&str> {
        self.label(LABEL_COMPOSE_DEPENDS_ON)
            .map(|v| {
                v.split(',')
                    .filter_map(|entry| entry.split(':').next())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;

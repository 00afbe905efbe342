// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure derivation of `run` arguments that recreate an existing container.
//!
//! Fields the image already supplies are omitted so a recreated container
//! stays byte-for-byte consistent with one created fresh from the same image
//! and no extra arguments.

use super::RunArgs;
use restarter_core::Container;
use std::collections::{BTreeMap, BTreeSet};

/// The subset of an image's own config relevant to subtracting defaults.
#[derive(Debug, Clone, Default)]
pub struct ImageConfig {
    pub env: Vec<String>,
    pub entrypoint: Option<Vec<String>>,
    pub cmd: Option<Vec<String>>,
    pub working_dir: Option<String>,
    pub labels: BTreeMap<String, String>,
    /// Container-side paths the image itself declares as volumes.
    pub volumes: BTreeSet<String>,
}

fn bind_target(bind: &str) -> &str {
    bind.splitn(3, ':').nth(1).unwrap_or(bind)
}

/// Derive the arguments needed to recreate `container`.
///
/// `new_network_mode`, when given, replaces the container's own network mode
/// (used when its former shared-namespace parent no longer exists) and clears
/// the hostname, since the runtime rejects setting one on a shared namespace.
pub fn derive_run_args(
    container: &Container,
    image: Option<&ImageConfig>,
    new_network_mode: Option<&str>,
) -> RunArgs {
    let image = image.cloned().unwrap_or_default();

    let env = container
        .env
        .iter()
        .filter(|e| !image.env.contains(e))
        .cloned()
        .collect();

    let entrypoint = if container.entrypoint == image.entrypoint {
        None
    } else {
        container.entrypoint.clone()
    };

    let cmd = if container.cmd == image.cmd {
        None
    } else {
        container.cmd.clone()
    };

    let working_dir = if container.working_dir == image.working_dir {
        None
    } else {
        container.working_dir.clone()
    };

    let labels = container
        .labels
        .iter()
        .filter(|(k, v)| image.labels.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let binds = container
        .binds
        .iter()
        .filter(|b| !image.volumes.contains(bind_target(b)))
        .cloned()
        .collect();

    let network_mode = new_network_mode
        .map(|p| format!("container:{p}"))
        .unwrap_or_else(|| match &container.network_mode {
            restarter_core::NetworkMode::Container(id) => format!("container:{id}"),
            restarter_core::NetworkMode::Other(mode) => mode.clone(),
        });

    let hostname = if new_network_mode.is_some() {
        None
    } else {
        Some(container.hostname.clone())
    };

    RunArgs {
        name: container.name.as_str().to_string(),
        image: container.image.clone(),
        env,
        entrypoint,
        cmd,
        working_dir,
        labels,
        network_mode,
        hostname,
        binds,
    }
}

#[cfg(test)]
#[path = "derive_tests.rs"]
mod tests;

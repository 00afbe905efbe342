// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The container runtime facade: everything the engine needs from Docker (or
//! a Docker-compatible API), and nothing else.

pub mod derive;
pub mod docker;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

use async_trait::async_trait;
use restarter_core::{Container, ContainerId};
use thiserror::Error;
use tokio_stream::Stream;
use std::pin::Pin;

pub use derive::{derive_run_args, ImageConfig};

/// Errors an adapter call can fail with. `NotFound` and `NameConflict` are the
/// two shapes the engine branches on directly; everything else is surfaced to
/// callers as an opaque fatal cause.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("name already in use by another container: {0}")]
    NameConflict(String),
    #[error("runtime error: {0}")]
    Other(String),
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuntimeError::NotFound(_))
    }

    pub fn is_name_conflict(&self) -> bool {
        matches!(self, RuntimeError::NameConflict(_))
    }
}

/// One event off the runtime's event stream, filtered to `type=container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEvent {
    pub status: String,
    pub id: ContainerId,
    pub name: String,
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<RuntimeEvent, RuntimeError>> + Send>>;

/// Arguments to recreate a container, derived by [`derive_run_args`] from an
/// existing snapshot and (optionally) a new network-namespace parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub name: String,
    pub image: String,
    pub env: Vec<String>,
    pub entrypoint: Option<Vec<String>>,
    pub cmd: Option<Vec<String>>,
    pub working_dir: Option<String>,
    pub labels: std::collections::BTreeMap<String, String>,
    pub network_mode: String,
    /// `None` when the container shares another's network namespace: the
    /// runtime forbids setting a hostname in that mode.
    pub hostname: Option<String>,
    pub binds: Vec<String>,
}

/// Facade over the container runtime. Implementations must not hold any
/// engine-side lock while awaiting a call here.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    /// All containers, running or not. Retries indefinitely on a transient
    /// `not found` error with a short delay between attempts.
    async fn list_all(&self) -> Result<Vec<Container>, RuntimeError>;

    async fn inspect(&self, id_or_name: &str) -> Result<Container, RuntimeError>;

    /// A cold stream of container lifecycle events, in emission order.
    async fn events(&self) -> Result<EventStream, RuntimeError>;

    async fn restart(&self, container: &Container) -> Result<(), RuntimeError>;

    async fn remove(&self, container: &Container, force: bool) -> Result<(), RuntimeError>;

    async fn run(&self, args: RunArgs) -> Result<Container, RuntimeError>;

    /// Image defaults for `image`, used to avoid double-specifying fields the
    /// image already supplies when deriving recreate arguments.
    async fn inspect_image(&self, image: &str) -> Result<ImageConfig, RuntimeError>;
}

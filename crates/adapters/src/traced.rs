// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability around runtime calls.

use crate::runtime::{EventStream, ImageConfig, RunArgs, RuntimeAdapter, RuntimeError};
use async_trait::async_trait;
use restarter_core::Container;
use tracing::Instrument;

/// Wraps any [`RuntimeAdapter`] and logs a span plus timing around every call.
#[derive(Clone)]
pub struct TracedRuntime<R> {
    inner: R,
}

impl<R> TracedRuntime<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: RuntimeAdapter> RuntimeAdapter for TracedRuntime<R> {
    async fn list_all(&self) -> Result<Vec<Container>, RuntimeError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.list_all().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(containers) => tracing::debug!(count = containers.len(), elapsed_ms, "listed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "list_all failed"),
            }
            result
        }
        .instrument(tracing::info_span!("runtime.list_all"))
        .await
    }

    async fn inspect(&self, id_or_name: &str) -> Result<Container, RuntimeError> {
        let result = self.inner.inspect(id_or_name).await;
        if let Err(e) = &result {
            tracing::debug!(target = id_or_name, error = %e, "inspect failed");
        }
        result
    }

    async fn events(&self) -> Result<EventStream, RuntimeError> {
        let result = self.inner.events().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "events stream failed to open");
        } else {
            tracing::info!("event stream opened");
        }
        result
    }

    async fn restart(&self, container: &Container) -> Result<(), RuntimeError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.restart(container).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "restarted"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "restart failed"),
            }
            result
        }
        .instrument(tracing::info_span!("runtime.restart", container = %container.name))
        .await
    }

    async fn remove(&self, container: &Container, force: bool) -> Result<(), RuntimeError> {
        async {
            let result = self.inner.remove(container, force).await;
            match &result {
                Ok(()) => tracing::info!("removed"),
                Err(e) => tracing::warn!(error = %e, "remove failed"),
            }
            result
        }
        .instrument(tracing::info_span!("runtime.remove", container = %container.name))
        .await
    }

    async fn run(&self, args: RunArgs) -> Result<Container, RuntimeError> {
        let name = args.name.clone();
        async {
            let start = std::time::Instant::now();
            let result = self.inner.run(args).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(c) => tracing::info!(new_id = %c.id, elapsed_ms, "ran"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "run failed"),
            }
            result
        }
        .instrument(tracing::info_span!("runtime.run", container = name))
        .await
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageConfig, RuntimeError> {
        let result = self.inner.inspect_image(image).await;
        if let Err(e) = &result {
            tracing::debug!(image, error = %e, "inspect_image failed");
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

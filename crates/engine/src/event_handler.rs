// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consumes the runtime's event stream and turns qualifying events into an
//! evaluator trigger plus a breadcrumb on the named worker.

use crate::error::{ActorFailure, FatalError};
use crate::registry::WorkerRegistry;
use crate::signal::Signal;
use restarter_adapters::{RuntimeAdapter, RuntimeEvent};
use restarter_core::ContainerName;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

pub struct EventHandler {
    runtime: Arc<dyn RuntimeAdapter>,
    registry: Arc<WorkerRegistry>,
    trigger: Arc<Signal<()>>,
    fatal_tx: mpsc::Sender<ActorFailure>,
}

impl EventHandler {
    pub fn new(
        runtime: Arc<dyn RuntimeAdapter>,
        registry: Arc<WorkerRegistry>,
        trigger: Arc<Signal<()>>,
        fatal_tx: mpsc::Sender<ActorFailure>,
    ) -> Self {
        Self {
            runtime,
            registry,
            trigger,
            fatal_tx,
        }
    }

    /// Runs until the event stream ends or errors, at which point it reports
    /// fatal: the periodic evaluator timer alone isn't a substitute for
    /// event-driven responsiveness, so losing the stream must be visible.
    pub async fn run(self) {
        let mut stream = match self.runtime.events().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "failed to open event stream");
                self.report_fatal(FatalError::Runtime(e)).await;
                return;
            }
        };

        loop {
            match stream.next().await {
                Some(Ok(event)) => self.handle(event).await,
                Some(Err(e)) => {
                    tracing::error!(error = %e, "event stream errored");
                    self.report_fatal(FatalError::Runtime(e)).await;
                    return;
                }
                None => {
                    tracing::error!("event stream ended");
                    self.report_fatal(FatalError::EventStreamEnded).await;
                    return;
                }
            }
        }
    }

    async fn handle(&self, event: RuntimeEvent) {
        if !is_interesting(&event.status) {
            return;
        }
        let name = ContainerName::new(event.name.as_str());
        self.registry.push_status(&name, event.status.clone()).await;
        self.trigger.set(()).await;
    }

    async fn report_fatal(&self, err: FatalError) {
        let _ = self.fatal_tx.send(ActorFailure::new("event_handler", err)).await;
    }
}

fn is_interesting(status: &str) -> bool {
    matches!(status, "start" | "health_status: unhealthy" | "die")
}

#[cfg(test)]
#[path = "event_handler_tests.rs"]
mod tests;

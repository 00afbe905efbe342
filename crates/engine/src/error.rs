// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two-taxon error model: classified failures a worker absorbs and keeps
//! running after, and fatal failures that terminate the daemon.

use thiserror::Error;

/// A restart attempt outcome that does not warrant tearing anything down.
/// Logged at info level and then forgotten; the worker awaits its next request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifiedFailure {
    #[error("container no longer exists: {0}")]
    ContainerGone(String),
    #[error("restart refused by the runtime: {0}")]
    RestartFailed(String),
    #[error("container already restarted since request was raised")]
    AlreadyRestarted,
    #[error("max retries reached ({0})")]
    MaxRetriesReached(u32),
    #[error("network_mode label missing, required to recreate")]
    NetworkModeMissing,
    #[error("no container matches target specifier: {0}")]
    UnresolvedSpecifier(String),
    #[error("name conflict on run, already restarted by an external program: {0}")]
    NameConflictOnRun(String),
}

/// An error from any non-worker actor, or any adapter error a worker cannot
/// classify. Forwarded to the supervisor, which terminates the process.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("runtime error: {0}")]
    Runtime(#[from] restarter_adapters::RuntimeError),
    #[error("event stream ended unexpectedly")]
    EventStreamEnded,
    #[error("{0}")]
    Other(String),
}

/// A fatal error tagged with the actor that raised it, as delivered on the
/// shared supervisor channel.
#[derive(Debug, Error)]
#[error("{actor}: {source}")]
pub struct ActorFailure {
    pub actor: &'static str,
    #[source]
    pub source: FatalError,
}

impl ActorFailure {
    pub fn new(actor: &'static str, source: impl Into<FatalError>) -> Self {
        Self {
            actor,
            source: source.into(),
        }
    }
}

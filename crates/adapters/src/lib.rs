// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the container runtime.

pub mod runtime;
pub mod traced;

pub use runtime::{
    derive_run_args, EventStream, ImageConfig, RunArgs, RuntimeAdapter, RuntimeError, RuntimeEvent,
};
pub use runtime::docker::DockerAdapter;
pub use traced::TracedRuntime;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use runtime::fake::{FakeCall, FakeRuntimeAdapter};

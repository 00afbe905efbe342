// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container restart supervisor daemon (restarterd)
//!
//! A long-running process that watches container health and dependency
//! ordering via a container runtime's event stream and a periodic poll, and
//! restarts (or recreates) containers that need it. Keeps no on-disk state.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("restarterd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("restarterd {}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Container restart supervisor daemon.");
                println!();
                println!("USAGE:");
                println!("    restarterd");
                println!();
                println!("Watches container health/dependency state via the configured container");
                println!("runtime and restarts or recreates containers labelled `restarter.enable=yes`.");
                println!("Configuration is read entirely from the environment (RESTARTER_* and");
                println!("DOCKER_HOST); the daemon keeps no state on disk.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: restarterd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    setup_logging();

    let config = Config::load()?;
    info!("starting restart supervisor");

    let mut supervisor = match lifecycle::startup(&config).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to start");
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        failure = supervisor.fatal_rx.recv() => {
            match failure {
                Some(failure) => {
                    error!(actor = failure.actor, error = %failure, "fatal error, shutting down");
                    std::process::exit(1);
                }
                None => {
                    error!("all actors exited without reporting; shutting down");
                    std::process::exit(1);
                }
            }
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
        }
    }

    Ok(())
}

/// Structured logging to stdout, filtered by `RUST_LOG` (default `info`).
/// The daemon keeps no on-disk state, so it has no log file of its own.
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

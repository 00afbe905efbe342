// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use restarter_adapters::FakeRuntimeAdapter;
use restarter_core::{
    ContainerId, ContainerName, ContainerSettings, FakeClock, HealthStatus, MaxRetries,
    NetworkMode, RunStatus,
};
use tokio::sync::mpsc;

fn container(id: &str, name: &str, started_at: u64, network_mode: NetworkMode) -> restarter_core::Container {
    restarter_core::Container {
        id: ContainerId::new(id),
        name: ContainerName::new(name),
        labels: Default::default(),
        status: RunStatus::Running,
        health: HealthStatus::Healthy,
        started_at,
        network_mode,
        image: "nginx:latest".into(),
        env: Vec::new(),
        entrypoint: None,
        cmd: None,
        working_dir: None,
        binds: Vec::new(),
        hostname: name.to_string(),
        raw: serde_json::Value::Null,
    }
}

fn deps(runtime: FakeRuntimeAdapter, clock: FakeClock) -> (Arc<WorkerDeps>, mpsc::Receiver<ActorFailure>) {
    let (fatal_tx, fatal_rx) = mpsc::channel(8);
    let settings = Arc::new(SettingsResolver::new(ContainerSettings::default(), 10));
    let deps = Arc::new(WorkerDeps {
        runtime: Arc::new(runtime),
        settings,
        clock: Arc::new(clock),
        fatal_tx,
    });
    (deps, fatal_rx)
}

#[tokio::test]
async fn already_restarted_since_request_is_classified_not_fatal() {
    let fake = FakeRuntimeAdapter::new();
    fake.seed(container("a", "web", 100, NetworkMode::Other("bridge".into())));
    let (deps, _rx) = deps(fake, FakeClock::new(100));

    let worker = Worker::new(ContainerName::new("web"));
    let result = worker.try_restart(&deps, 50).await;
    assert_eq!(result, Err(ClassifiedFailure::AlreadyRestarted));
}

#[tokio::test]
async fn missing_container_is_classified_container_gone() {
    let fake = FakeRuntimeAdapter::new();
    let (deps, _rx) = deps(fake, FakeClock::new(100));

    let worker = Worker::new(ContainerName::new("ghost"));
    let result = worker.try_restart(&deps, 50).await;
    assert_eq!(
        result,
        Err(ClassifiedFailure::ContainerGone("ghost".to_string()))
    );
}

#[tokio::test]
async fn restart_in_place_when_network_mode_is_not_shared() {
    let fake = FakeRuntimeAdapter::new();
    fake.seed(container("a", "web", 0, NetworkMode::Other("bridge".into())));
    let (deps, _rx) = deps(fake.clone(), FakeClock::new(0));

    let worker = Worker::new(ContainerName::new("web"));
    let result = worker.try_restart(&deps, 0).await;
    assert!(result.is_ok());
    assert!(fake
        .calls()
        .iter()
        .any(|c| matches!(c, restarter_adapters::FakeCall::Restart(_))));
}

#[tokio::test]
async fn restarts_in_place_when_shared_parent_still_exists() {
    let fake = FakeRuntimeAdapter::new();
    fake.seed(container("parent", "vpn", 0, NetworkMode::Other("bridge".into())));
    fake.seed(container("a", "web", 0, NetworkMode::Container(ContainerId::new("parent"))));
    let (deps, _rx) = deps(fake.clone(), FakeClock::new(0));

    let worker = Worker::new(ContainerName::new("web"));
    let result = worker.try_restart(&deps, 0).await;
    assert!(result.is_ok());
    assert!(fake
        .calls()
        .iter()
        .any(|c| matches!(c, restarter_adapters::FakeCall::Restart(id) if id == "a")));
}

#[tokio::test]
async fn recreates_when_shared_parent_is_gone() {
    let fake = FakeRuntimeAdapter::new();
    let mut web = container("a", "web", 0, NetworkMode::Container(ContainerId::new("gone")));
    web.labels.insert("restarter.network_mode".to_string(), "service:vpn".to_string());
    web.labels.insert("com.docker.compose.service".to_string(), "web".to_string());
    fake.seed(web);
    let mut new_parent = container("p2", "vpn_1", 0, NetworkMode::Other("bridge".into()));
    new_parent.labels.insert("com.docker.compose.service".to_string(), "vpn".to_string());
    fake.seed(new_parent);

    let (deps, _rx) = deps(fake.clone(), FakeClock::new(0));
    let worker = Worker::new(ContainerName::new("web"));
    let result = worker.try_restart(&deps, 0).await;
    assert!(result.is_ok(), "{result:?}");
    assert!(fake
        .calls()
        .iter()
        .any(|c| matches!(c, restarter_adapters::FakeCall::Remove(_))));
    assert!(fake
        .calls()
        .iter()
        .any(|c| matches!(c, restarter_adapters::FakeCall::Run(_))));
}

#[tokio::test]
async fn recreate_without_network_mode_label_is_classified() {
    let fake = FakeRuntimeAdapter::new();
    let web = container("a", "web", 0, NetworkMode::Container(ContainerId::new("gone")));
    fake.seed(web);
    let (deps, _rx) = deps(fake, FakeClock::new(0));

    let worker = Worker::new(ContainerName::new("web"));
    let result = worker.try_restart(&deps, 0).await;
    assert_eq!(result, Err(ClassifiedFailure::NetworkModeMissing));
}

#[tokio::test]
async fn max_retries_ceiling_stops_after_configured_attempts() {
    let fake = FakeRuntimeAdapter::new();
    let mut web = container("a", "web", 0, NetworkMode::Other("bridge".into()));
    web.labels.insert("restarter.max_retries".to_string(), "3".to_string());
    fake.seed(web);
    // Every restart call fails so the worker keeps retrying.
    fake.fail_restart(&ContainerId::new("a"), restarter_adapters::RuntimeError::Other("refused".into()));
    let (fatal_tx, mut fatal_rx) = mpsc::channel(8);
    let settings = Arc::new(SettingsResolver::new(ContainerSettings::default(), 10));
    let deps = Arc::new(WorkerDeps {
        runtime: Arc::new(fake.clone()),
        settings,
        clock: Arc::new(FakeClock::new(0)),
        fatal_tx,
    });

    let worker = Worker::new(ContainerName::new("web"));
    for i in 1..=4 {
        let result = worker.try_restart(&deps, 0).await;
        if i <= 3 {
            // restart() itself is refused by the runtime each time, classified
            // and retried rather than reported fatal.
            assert!(matches!(result, Err(ClassifiedFailure::RestartFailed(_))));
        } else {
            assert_eq!(result, Err(ClassifiedFailure::MaxRetriesReached(4)));
        }
    }

    let restart_calls = fake
        .calls()
        .into_iter()
        .filter(|c| matches!(c, restarter_adapters::FakeCall::Restart(_)))
        .count();
    assert_eq!(restart_calls, 3);
    drop(deps);
    fatal_rx.close();
}

#[tokio::test]
async fn unlimited_max_retries_never_classified_as_exceeded() {
    assert!(!MaxRetries::Unlimited.exceeded_by(1_000_000));
}

#[tokio::test]
async fn recent_status_ring_keeps_only_last_two() {
    let worker = Worker::new(ContainerName::new("web"));
    worker.push_status("start").await;
    worker.push_status("health_status: unhealthy").await;
    worker.push_status("die").await;
    assert_eq!(
        worker.recent_statuses().await,
        vec!["health_status: unhealthy".to_string(), "die".to_string()]
    );
}

#[tokio::test]
async fn done_and_mailbox_state_toggle_through_lifecycle() {
    let worker = Worker::new(ContainerName::new("web"));
    assert!(worker.is_done());
    assert!(worker.mailbox_is_empty().await);
    worker.request_restart(1).await;
    assert!(!worker.mailbox_is_empty().await);
}

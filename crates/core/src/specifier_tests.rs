// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::container::{HealthStatus, NetworkMode, RunStatus};
use std::collections::BTreeMap;

fn container(name: &str, labels: &[(&str, &str)]) -> Container {
    Container {
        id: ContainerId::new(format!("id-{name}")),
        name: ContainerName::new(name),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        status: RunStatus::Running,
        health: HealthStatus::Healthy,
        started_at: 0,
        network_mode: NetworkMode::Other("bridge".into()),
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

#[test]
fn parses_container_prefix() {
    assert_eq!(
        Specifier::parse("container:db"),
        Specifier::Container("db".to_string())
    );
}

#[test]
fn parses_service_prefix() {
    assert_eq!(
        Specifier::parse("service:db"),
        Specifier::Service("db".to_string())
    );
}

#[test]
fn parses_bare_name() {
    assert_eq!(Specifier::parse("db"), Specifier::Bare("db".to_string()));
}

#[test]
fn parse_list_splits_and_trims() {
    let list = Specifier::parse_list("container:a, service:b , c");
    assert_eq!(
        list,
        vec![
            Specifier::Container("a".to_string()),
            Specifier::Service("b".to_string()),
            Specifier::Bare("c".to_string()),
        ]
    );
}

#[test]
fn parse_list_skips_empty_entries() {
    assert!(Specifier::parse_list("").is_empty());
    assert_eq!(Specifier::parse_list("a,,b").len(), 2);
}

#[test]
fn bare_resolves_as_service_when_depender_has_service_label() {
    let depender = container("web", &[("com.docker.compose.service", "web")]);
    let db = container("db_1", &[("com.docker.compose.service", "db")]);
    let by_name = HashMap::from([(db.name.clone(), &db)]);
    let by_service = HashMap::from([("db".to_string(), &db)]);

    let resolved = Specifier::Bare("db".to_string()).resolve(&depender, &by_name, &by_service);
    assert_eq!(resolved.map(|c| c.id.as_str()), Some(db.id.as_str()));
}

#[test]
fn bare_resolves_as_container_name_when_depender_has_no_service_label() {
    let depender = container("web", &[]);
    let db = container("db", &[]);
    let by_name = HashMap::from([(db.name.clone(), &db)]);
    let by_service = HashMap::new();

    let resolved = Specifier::Bare("db".to_string()).resolve(&depender, &by_name, &by_service);
    assert_eq!(resolved.map(|c| c.id.as_str()), Some(db.id.as_str()));
}

#[test]
fn container_specifier_ignores_service_index() {
    let depender = container("web", &[("com.docker.compose.service", "web")]);
    let db = container("db", &[]);
    let by_name = HashMap::from([(db.name.clone(), &db)]);
    let by_service = HashMap::new();

    let resolved =
        Specifier::Container("db".to_string()).resolve(&depender, &by_name, &by_service);
    assert_eq!(resolved.map(|c| c.id.as_str()), Some(db.id.as_str()));
}

#[test]
fn unresolvable_specifier_returns_none() {
    let depender = container("web", &[]);
    let by_name = HashMap::new();
    let by_service = HashMap::new();
    assert!(Specifier::Bare("ghost".to_string())
        .resolve(&depender, &by_name, &by_service)
        .is_none());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing and resolution of `depends_on` / `network_mode` target specifiers.

use crate::container::Container;
use crate::id::{ContainerId, ContainerName};
use std::collections::HashMap;

/// A parsed target reference: `container:<name>`, `service:<name>`, or a bare
/// name whose interpretation depends on the depender (see [`Specifier::resolve`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    Container(String),
    Service(String),
    Bare(String),
}

impl Specifier {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(name) = raw.strip_prefix("container:") {
            Specifier::Container(name.trim().to_string())
        } else if let Some(name) = raw.strip_prefix("service:") {
            Specifier::Service(name.trim().to_string())
        } else {
            Specifier::Bare(raw.to_string())
        }
    }

    /// Parse a comma-separated list of specifiers, skipping empty entries.
    pub fn parse_list(raw: &str) -> Vec<Specifier> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Specifier::parse)
            .collect()
    }

    /// Resolve against the two indexes the evaluator builds once per pass.
    ///
    /// A bare name resolves as a compose service when `depender` itself carries
    /// a compose-service label; otherwise it resolves as a container name.
    pub fn resolve<'a>(
        &self,
        depender: &Container,
        by_name: &HashMap<ContainerName, &'a Container>,
        by_service: &HashMap<String, &'a Container>,
    ) -> Option<&'a Container> {
        match self {
            Specifier::Container(name) => by_name.get(&ContainerName::new(name.as_str())).copied(),
            Specifier::Service(service) => by_service.get(service).copied(),
            Specifier::Bare(name) => {
                if depender.compose_service().is_some() {
                    by_service.get(name).copied()
                } else {
                    by_name.get(&ContainerName::new(name.as_str())).copied()
                }
            }
        }
    }

    /// Resolve against an id index, used on the recreate path where only a
    /// freshly-listed inventory (not the stale pass indexes) is available.
    pub fn resolve_fresh<'a>(
        &self,
        depender_has_service: bool,
        by_id: &HashMap<ContainerId, &'a Container>,
        by_name: &HashMap<ContainerName, &'a Container>,
        by_service: &HashMap<String, &'a Container>,
    ) -> Option<&'a Container> {
        match self {
            Specifier::Container(name) => by_name
                .get(&ContainerName::new(name.as_str()))
                .copied()
                .or_else(|| by_id.get(&ContainerId::new(name.as_str())).copied()),
            Specifier::Service(service) => by_service.get(service).copied(),
            Specifier::Bare(name) => {
                if depender_has_service {
                    by_service.get(name).copied()
                } else {
                    by_name.get(&ContainerName::new(name.as_str())).copied()
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "specifier_tests.rs"]
mod tests;

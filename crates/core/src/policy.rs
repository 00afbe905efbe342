// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart policies and the set type they're configured in.

use std::fmt;
use std::str::FromStr;

/// A reason a container can qualify for a restart.
///
/// Policies are additive: a container is acted on if any enabled policy fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Policy {
    /// Act when the container's own health check reports `unhealthy`.
    Unhealthy,
    /// Act when a declared dependency is unhealthy, not running, or started later.
    Dependency,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Policy::Unhealthy => "unhealthy",
            Policy::Dependency => "dependency",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown restart policy: {0}")]
pub struct ParsePolicyError(String);

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unhealthy" => Ok(Policy::Unhealthy),
            "dependency" => Ok(Policy::Dependency),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// An ordered, deduplicated collection of [`Policy`] values.
///
/// Ordering is by the policy's declaration order, not input order, so two
/// settings strings that name the same policies in a different order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySet(Vec<Policy>);

impl PolicySet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, policy: Policy) -> bool {
        self.0.contains(&policy)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.0.iter()
    }

    /// Parse a comma-separated list of policy names, deduplicating and sorting
    /// into declaration order. Unknown entries are rejected wholesale: a
    /// malformed `policy` label falls back to the process default rather than
    /// partially applying.
    pub fn parse(raw: &str) -> Result<Self, ParsePolicyError> {
        let mut policies: Vec<Policy> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Policy::from_str)
            .collect::<Result<_, _>>()?;
        policies.sort();
        policies.dedup();
        Ok(Self(policies))
    }
}

impl FromIterator<Policy> for PolicySet {
    fn from_iter<T: IntoIterator<Item = Policy>>(iter: T) -> Self {
        let mut policies: Vec<Policy> = iter.into_iter().collect();
        policies.sort();
        policies.dedup();
        Self(policies)
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;

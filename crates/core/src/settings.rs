// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide and per-container configuration.
//!
//! Process-wide values come from `RESTARTER_<NAME>` environment variables.
//! Per-container values come from `restarter.<name>` labels and fall back to
//! the process-wide value of the same name when absent or malformed.

use crate::container::Container;
use crate::policy::{Policy, PolicySet};
use crate::specifier::Specifier;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::str::FromStr;

pub const LABEL_PREFIX: &str = "restarter.";
pub const ENV_PREFIX: &str = "RESTARTER_";

/// Backoff curve applied between successive restart attempts on the same worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    #[default]
    None,
    Linear,
    Exponential,
}

impl FromStr for Backoff {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Backoff::None),
            "linear" => Ok(Backoff::Linear),
            "exponential" => Ok(Backoff::Exponential),
            _ => Err(()),
        }
    }
}

impl Backoff {
    /// Delay in seconds before attempt number `restart_count`, capped at `max`.
    pub fn delay_seconds(&self, seconds_between_retries: u64, restart_count: u32, max: u64) -> u64 {
        match self {
            Backoff::None => seconds_between_retries,
            Backoff::Linear => (seconds_between_retries.saturating_mul(restart_count as u64)).min(max),
            Backoff::Exponential => {
                let factor = 1u64.checked_shl(restart_count).unwrap_or(u64::MAX);
                seconds_between_retries.saturating_mul(factor).min(max)
            }
        }
    }
}

/// `max_retries` as configured: either a finite cap or "unlimited".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxRetries {
    Limited(u32),
    Unlimited,
}

impl MaxRetries {
    pub fn exceeded_by(&self, restart_count: u32) -> bool {
        match self {
            MaxRetries::Limited(n) => restart_count > *n,
            MaxRetries::Unlimited => false,
        }
    }
}

impl FromStr for MaxRetries {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            Ok(MaxRetries::Unlimited)
        } else {
            s.parse().map(MaxRetries::Limited)
        }
    }
}

/// Settings resolved for one container: defaults layered with its own labels.
#[derive(Debug, Clone)]
pub struct ContainerSettings {
    pub enable: bool,
    pub depends_on: Vec<Specifier>,
    pub network_mode: Option<Specifier>,
    pub policy: PolicySet,
    pub max_retries: MaxRetries,
    pub backoff: Backoff,
    pub seconds_between_retries: u64,
    pub backoff_max_seconds: u64,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            enable: true,
            depends_on: Vec::new(),
            network_mode: None,
            policy: [Policy::Unhealthy, Policy::Dependency].into_iter().collect(),
            max_retries: MaxRetries::Unlimited,
            backoff: Backoff::None,
            seconds_between_retries: 30,
            backoff_max_seconds: 600,
        }
    }
}

/// Settings that apply to the daemon as a whole, plus the process-wide
/// defaults every per-container setting falls back to.
#[derive(Debug, Clone)]
pub struct ProcessSettings {
    pub check_min_frequency_seconds: u64,
    pub check_max_frequency_seconds: u64,
    pub gc_every_seconds: u64,
    pub container_defaults: ContainerSettings,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            check_min_frequency_seconds: 5,
            check_max_frequency_seconds: 60,
            gc_every_seconds: 300,
            container_defaults: ContainerSettings::default(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}")).ok()
}

fn parse_bool_loose(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

impl ProcessSettings {
    /// Load process-wide settings from the environment, falling back to
    /// built-in defaults for anything absent or unparseable.
    pub fn from_env() -> Self {
        let defaults = ContainerSettings::default();
        let mut settings = Self {
            check_min_frequency_seconds: env_var("CHECK_MIN_FREQUENCY_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            check_max_frequency_seconds: env_var("CHECK_MAX_FREQUENCY_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            gc_every_seconds: env_var("GC_EVERY_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            container_defaults: defaults,
        };

        if let Some(v) = env_var("ENABLE").and_then(|v| parse_bool_loose(&v)) {
            settings.container_defaults.enable = v;
        }
        if let Some(v) = env_var("DEPENDS_ON") {
            settings.container_defaults.depends_on = Specifier::parse_list(&v);
        }
        if let Some(v) = env_var("NETWORK_MODE") {
            settings.container_defaults.network_mode = Some(Specifier::parse(&v));
        }
        if let Some(v) = env_var("POLICY").and_then(|v| PolicySet::parse(&v).ok()) {
            settings.container_defaults.policy = v;
        }
        if let Some(v) = env_var("MAX_RETRIES").and_then(|v| v.parse().ok()) {
            settings.container_defaults.max_retries = v;
        }
        if let Some(v) = env_var("BACKOFF").and_then(|v| Backoff::from_str(&v).ok()) {
            settings.container_defaults.backoff = v;
        }
        if let Some(v) = env_var("SECONDS_BETWEEN_RETRIES").and_then(|v| v.parse().ok()) {
            settings.container_defaults.seconds_between_retries = v;
        }
        if let Some(v) = env_var("BACKOFF_MAX_SECONDS").and_then(|v| v.parse().ok()) {
            settings.container_defaults.backoff_max_seconds = v;
        }

        settings
    }
}

/// Resolves and memoizes per-container settings from labels, falling back to
/// process-wide defaults. Memoized by `(id, name)`, bounded to avoid unbounded
/// growth as containers churn; recreation changes the id and so naturally
/// evicts stale entries rather than serving them stale.
pub struct SettingsResolver {
    defaults: ContainerSettings,
    cache: Mutex<LruCache<(String, String), ContainerSettings>>,
}

impl SettingsResolver {
    pub fn new(defaults: ContainerSettings, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            defaults,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Resolve settings for `container`, logging a warning for each label that
    /// failed to parse and fell back to the default instead.
    pub fn resolve(&self, container: &Container) -> ContainerSettings {
        let key = (container.id.as_str().to_string(), container.name.as_str().to_string());
        if let Some(cached) = self.cache.lock().get(&key) {
            return cached.clone();
        }

        let resolved = self.resolve_uncached(container);
        self.cache.lock().put(key, resolved.clone());
        tracing::info!(
            container = %container.name,
            enable = resolved.enable,
            policy = ?resolved.policy.iter().collect::<Vec<_>>(),
            "resolved container settings"
        );
        resolved
    }

    fn resolve_uncached(&self, container: &Container) -> ContainerSettings {
        let mut settings = self.defaults.clone();
        let labels = &container.labels;

        if let Some(v) = self.label(labels, container, "enable", parse_bool_loose) {
            settings.enable = v;
        }
        if let Some(raw) = labels.get(&format!("{LABEL_PREFIX}depends_on")) {
            settings.depends_on = Specifier::parse_list(raw);
        }
        if let Some(raw) = labels.get(&format!("{LABEL_PREFIX}network_mode")) {
            settings.network_mode = Some(Specifier::parse(raw));
        }
        if let Some(v) = self.label(labels, container, "policy", |s| PolicySet::parse(s).ok()) {
            settings.policy = v;
        }
        if let Some(v) = self.label(labels, container, "max_retries", |s| s.parse().ok()) {
            settings.max_retries = v;
        }
        if let Some(v) = self.label(labels, container, "backoff", |s| Backoff::from_str(s).ok()) {
            settings.backoff = v;
        }
        if let Some(v) = self.label(labels, container, "seconds_between_retries", |s| s.parse().ok()) {
            settings.seconds_between_retries = v;
        }
        if let Some(v) = self.label(labels, container, "backoff_max_seconds", |s| s.parse().ok()) {
            settings.backoff_max_seconds = v;
        }

        settings
    }

    fn label<T>(
        &self,
        labels: &std::collections::BTreeMap<String, String>,
        container: &Container,
        name: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let raw = labels.get(&format!("{LABEL_PREFIX}{name}"))?;
        match parse(raw) {
            Some(v) => Some(v),
            None => {
                tracing::warn!(
                    container = %container.name,
                    label = name,
                    value = raw.as_str(),
                    "malformed label value, falling back to default"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

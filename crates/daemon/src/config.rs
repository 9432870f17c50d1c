// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use wfs_scheduler::{SchedulerConfig, DEFAULT_MAX_ACTIVE_USERS};

/// Log filter directive, consumed by `tracing-subscriber`'s `EnvFilter`.
pub fn log_filter() -> String {
    std::env::var("WFS_LOG").unwrap_or_else(|_| "info".to_string())
}

fn parse_opt<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_opt(std::env::var(key).ok(), default)
}

/// Resolve the scheduler's worker cap and dispatch cadence from the
/// environment, falling back to [`SchedulerConfig::default`]'s values.
#[must_use]
pub fn scheduler_config() -> SchedulerConfig {
    let defaults = SchedulerConfig::default();
    SchedulerConfig {
        max_workers: parse_env("WFS_MAX_WORKERS", defaults.max_workers),
        dispatch_interval_ms: parse_env("WFS_DISPATCH_INTERVAL_MS", defaults.dispatch_interval_ms),
    }
}

/// Resolve the cap on concurrently active tenants from the environment.
#[must_use]
pub fn max_active_users() -> usize {
    parse_env("WFS_MAX_ACTIVE_USERS", DEFAULT_MAX_ACTIVE_USERS)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

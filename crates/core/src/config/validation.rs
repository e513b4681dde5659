//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.
//! Pattern syntax is checked later, by the program compiler.

use crate::config::AppConfig;
use crate::rule::{StrategyKind, check_rules};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - a route has an empty pattern, a zero bound or max-age, or a non-positive timeout
    /// - the `/**` catch-all route is not the last route
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) URL".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        for (index, rule) in self.sw.routes.iter().enumerate() {
            if rule.pattern.is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("sw.routes[{index}]"),
                    reason: "match pattern must not be empty".into(),
                });
            }
        }
        if let Some((index, reason)) = check_rules(&self.sw.routes).into_iter().next() {
            return Err(ConfigError::Invalid { field: format!("sw.routes[{index}]"), reason });
        }

        for (index, rule) in self.sw.routes.iter().enumerate() {
            if rule.network_timeout_seconds.is_some() && rule.strategy != StrategyKind::NetworkFirst {
                tracing::warn!(
                    route = index,
                    strategy = %rule.strategy,
                    "network_timeout_seconds only applies to NetworkFirst routes; ignoring"
                );
            }
            if rule.strategy == StrategyKind::NetworkOnly && (rule.cache_name.is_some() || rule.max_entries.is_some()) {
                tracing::warn!(route = index, "NetworkOnly routes never touch a store; cache settings are ignored");
            }
        }

        Ok(())
    }
}

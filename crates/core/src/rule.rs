//! Route rules: which caching strategy handles which paths.
//!
//! Rules form an ordered list and the first matching rule wins. There is no
//! priority beyond declaration order, so a broad rule placed early shadows
//! every narrower rule after it.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default NetworkFirst race timeout.
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(3);

/// The five request-handling policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub enum StrategyKind {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
    NetworkOnly,
    CacheOnly,
}

impl StrategyKind {
    /// Whether this strategy reads or writes a named store.
    pub fn uses_store(self) -> bool {
        !matches!(self, StrategyKind::NetworkOnly)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::CacheFirst => "CacheFirst",
            StrategyKind::NetworkFirst => "NetworkFirst",
            StrategyKind::StaleWhileRevalidate => "StaleWhileRevalidate",
            StrategyKind::NetworkOnly => "NetworkOnly",
            StrategyKind::CacheOnly => "CacheOnly",
        };
        f.write_str(name)
    }
}

/// One entry of the ordered route list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Glob-like path pattern (see [`crate::pattern`]).
    #[serde(rename = "match", alias = "pattern")]
    pub pattern: String,

    pub strategy: StrategyKind,

    /// Named store; defaults to `rt-<strategy>`.
    #[serde(default, alias = "cache", skip_serializing_if = "Option::is_none")]
    pub cache_name: Option<String>,

    /// Entries older than this no longer satisfy cache-first lookups.
    #[serde(default, alias = "max_age", skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<u64>,

    /// FIFO bound applied to the store after each write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,

    /// NetworkFirst race timeout; fractional seconds allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_timeout_seconds: Option<f64>,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, strategy: StrategyKind) -> Self {
        Self {
            pattern: pattern.into(),
            strategy,
            cache_name: None,
            max_age_seconds: None,
            max_entries: None,
            network_timeout_seconds: None,
        }
    }

    pub fn with_cache(mut self, name: impl Into<String>) -> Self {
        self.cache_name = Some(name.into());
        self
    }

    pub fn with_max_age(mut self, seconds: u64) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    pub fn with_network_timeout(mut self, seconds: f64) -> Self {
        self.network_timeout_seconds = Some(seconds);
        self
    }

    /// Store name, falling back to `rt-<strategy>` in lowercase.
    pub fn resolved_cache_name(&self) -> String {
        self.cache_name
            .clone()
            .unwrap_or_else(|| format!("rt-{}", self.strategy.to_string().to_lowercase()))
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_seconds.map(Duration::from_secs)
    }

    pub fn network_timeout(&self) -> Duration {
        self.network_timeout_seconds
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
            .unwrap_or(DEFAULT_NETWORK_TIMEOUT)
    }

    pub fn is_catch_all(&self) -> bool {
        self.pattern == "/**"
    }
}

const CATCH_ALL_NOT_LAST: &str = "the `/**` catch-all must be the last route; routes after it are unreachable";

/// Check the invariants of an ordered rule list that pattern syntax does not
/// cover: a single trailing catch-all, non-zero bounds and positive timeouts.
///
/// Returns `(index, reason)` for every offending rule, in order.
pub fn check_rules(rules: &[Rule]) -> Vec<(usize, String)> {
    let last = rules.len().saturating_sub(1);
    let mut problems = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        if rule.is_catch_all() && index != last {
            problems.push((index, CATCH_ALL_NOT_LAST.into()));
        }
        if rule.max_entries == Some(0) {
            problems.push((index, "max_entries must be greater than 0".into()));
        }
        if rule.max_age_seconds == Some(0) {
            problems.push((index, "max_age must be greater than 0".into()));
        }
        if let Some(timeout) = rule.network_timeout_seconds {
            if !(timeout.is_finite() && timeout > 0.0) {
                problems.push((index, "network_timeout_seconds must be a positive number".into()));
            }
        }
    }

    problems
}

/// The stock rule list: API calls network-first, images and fonts cache-first,
/// everything else stale-while-revalidate.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new("/api/**", StrategyKind::NetworkFirst)
            .with_cache("api-cache")
            .with_max_age(60 * 5),
        Rule::new("*.{png,jpg,jpeg,gif,svg,webp,ico}", StrategyKind::CacheFirst)
            .with_cache("images")
            .with_max_age(60 * 60 * 24 * 30)
            .with_max_entries(100),
        Rule::new("*.{woff,woff2,ttf,eot}", StrategyKind::CacheFirst)
            .with_cache("fonts")
            .with_max_age(60 * 60 * 24 * 365),
        Rule::new("/**", StrategyKind::StaleWhileRevalidate),
    ]
}

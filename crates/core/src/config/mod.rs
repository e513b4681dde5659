//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PWAKIT_*, `__` separates nested keys)
//! 2. TOML config file (explicit path, or PWAKIT_CONFIG_FILE)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::rule::{Rule, default_rules};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the worker serves; site-relative URLs resolve against it.
    ///
    /// Set via PWAKIT_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite database holding all named stores.
    ///
    /// Set via PWAKIT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for outgoing requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport-level timeout for every outgoing request, in milliseconds.
    ///
    /// This is a ceiling independent of the NetworkFirst race timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub sw: SwConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Route program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwConfig {
    /// Where the compiled program text is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Where the push-backend side file is written (only when needed).
    #[serde(default = "default_push_output")]
    pub push_output: PathBuf,

    /// Static asset directory precache patterns are resolved against.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Glob patterns (relative to `public_dir`) of files to precache.
    #[serde(default)]
    pub precache: Vec<String>,

    /// Ordered route rules. First match wins.
    #[serde(default = "default_rules")]
    pub routes: Vec<Rule>,
}

/// Push notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Wire push and notification-click handling into the worker.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Icon used when a push payload omits one.
    #[serde(default = "default_icon")]
    pub default_icon: String,

    /// Badge used when a push payload omits one.
    #[serde(default = "default_badge")]
    pub badge: String,

    #[serde(default)]
    pub vapid_public_key: String,

    /// Base URL of the push backend.
    #[serde(default)]
    pub server_url: String,

    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub api_key: String,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pwakit-cache.sqlite")
}

fn default_user_agent() -> String {
    "pwakit/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_output() -> PathBuf {
    PathBuf::from("./public/sw-program.json")
}

fn default_push_output() -> PathBuf {
    PathBuf::from("./public/pwa-push.json")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_icon() -> String {
    "/icons/icon-192.png".into()
}

fn default_badge() -> String {
    "/icons/badge-72.png".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            sw: SwConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Default for SwConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            push_output: default_push_output(),
            public_dir: default_public_dir(),
            precache: Vec::new(),
            routes: default_rules(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_icon: default_icon(),
            badge: default_badge(),
            vapid_public_key: String::new(),
            server_url: String::new(),
            app_id: String::new(),
            api_key: String::new(),
        }
    }
}

impl NotificationsConfig {
    /// Whether a push-backend side file should be emitted.
    pub fn has_push_backend(&self) -> bool {
        !self.server_url.is_empty() || !self.app_id.is_empty() || !self.api_key.is_empty()
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed origin. Only valid after [`AppConfig::validate`].
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PWAKIT_`
    /// 2. TOML file from `PWAKIT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("PWAKIT_CONFIG_FILE").ok().map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    /// Load with an explicit TOML file in place of `PWAKIT_CONFIG_FILE`.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::LoadFailed(format!("config file not found: {}", path.display())));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(
            Env::prefixed("PWAKIT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

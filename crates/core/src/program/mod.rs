//! The program synthesizer.
//!
//! Compiles a resolved configuration into a [`Program`]: the ordered route
//! table with every pattern compiled and every cache name resolved, the
//! precache manifest, and the notification settings. A program round-trips
//! through its JSON text; loading text recompiles every pattern and rechecks
//! the rule list, so an invalid program never reaches a worker.

pub mod emit;
pub mod precache;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{AppConfig, NotificationsConfig};
use crate::error::RouteError;
use crate::pattern::Pattern;
use crate::rule::{Rule, check_rules};
use crate::Error;

pub use emit::{Emitted, PushConfig, emit};
pub use precache::resolve_precache;

/// Dedicated store filled by the precache installer.
pub const PRECACHE_NAME: &str = "precache-v1";

/// Program text format version.
pub const PROGRAM_VERSION: u32 = 1;

/// URLs fetched into the precache store during install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecacheManifest {
    pub cache_name: String,
    /// Site-relative URLs, resolved against the origin at install time.
    pub urls: Vec<String>,
}

/// One rule with its pattern compiled and its store name resolved.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    /// Position in declaration order.
    pub index: usize,
    pub rule: Rule,
    pub pattern: Pattern,
    pub cache_name: String,
}

impl CompiledRoute {
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }
}

/// The executable route program for one origin.
#[derive(Debug, Clone)]
pub struct Program {
    origin: Url,
    precache: PrecacheManifest,
    routes: Vec<CompiledRoute>,
    notifications: NotificationsConfig,
}

#[derive(Serialize, Deserialize)]
struct ProgramText {
    version: u32,
    origin: String,
    precache: PrecacheManifest,
    routes: Vec<Rule>,
    notifications: NotificationsConfig,
}

impl Program {
    /// Compile a configuration with an already-resolved precache URL list.
    ///
    /// Every malformed route is reported, not just the first.
    pub fn compile(config: &AppConfig, precache_urls: Vec<String>) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let precache = PrecacheManifest { cache_name: PRECACHE_NAME.to_string(), urls: precache_urls };
        Self::assemble(origin, precache, &config.sw.routes, config.notifications.clone())
    }

    /// Resolve precache globs against `sw.public_dir`, then compile.
    pub fn build(config: &AppConfig) -> Result<Self, Error> {
        let urls = resolve_precache(&config.sw.precache, &config.sw.public_dir)?;
        Self::compile(config, urls)
    }

    /// Load program text produced by [`Program::to_text`].
    pub fn from_text(text: &str) -> Result<Self, Error> {
        let parsed: ProgramText = serde_json::from_str(text).map_err(|e| Error::Program(e.to_string()))?;
        if parsed.version != PROGRAM_VERSION {
            return Err(Error::Program(format!(
                "unsupported program version {} (expected {PROGRAM_VERSION})",
                parsed.version
            )));
        }
        let origin = Url::parse(&parsed.origin).map_err(|e| Error::Program(format!("origin: {e}")))?;
        Self::assemble(origin, parsed.precache, &parsed.routes, parsed.notifications)
    }

    fn assemble(
        origin: Url, precache: PrecacheManifest, rules: &[Rule], notifications: NotificationsConfig,
    ) -> Result<Self, Error> {
        let mut routes = Vec::with_capacity(rules.len());
        let mut errors = Vec::new();

        for (index, rule) in rules.iter().enumerate() {
            match Pattern::compile(&rule.pattern) {
                Ok(pattern) => routes.push(CompiledRoute {
                    index,
                    rule: rule.clone(),
                    pattern,
                    cache_name: rule.resolved_cache_name(),
                }),
                Err(e) => errors.push(RouteError { index, pattern: rule.pattern.clone(), reason: e.to_string() }),
            }
        }

        errors.extend(check_rules(rules).into_iter().map(|(index, reason)| RouteError {
            index,
            pattern: rules[index].pattern.clone(),
            reason,
        }));
        if !errors.is_empty() {
            errors.sort_by_key(|e| e.index);
            return Err(Error::InvalidRoutes(errors));
        }

        Ok(Self { origin, precache, routes, notifications })
    }

    /// Serialize to program text. Cache names are written out resolved.
    pub fn to_text(&self) -> Result<String, Error> {
        let text = ProgramText {
            version: PROGRAM_VERSION,
            origin: self.origin.to_string(),
            precache: self.precache.clone(),
            routes: self
                .routes
                .iter()
                .map(|route| Rule { cache_name: Some(route.cache_name.clone()), ..route.rule.clone() })
                .collect(),
            notifications: self.notifications.clone(),
        };
        serde_json::to_string_pretty(&text).map_err(|e| Error::Program(e.to_string()))
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn precache(&self) -> &PrecacheManifest {
        &self.precache
    }

    /// Routes in declaration order.
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn notifications(&self) -> &NotificationsConfig {
        &self.notifications
    }

    /// The first route whose pattern matches `path`.
    pub fn route_for(&self, path: &str) -> Option<&CompiledRoute> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Distinct store names referenced by routes, in first-use order.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for route in self.routes.iter().filter(|r| r.rule.strategy.uses_store()) {
            if !names.contains(&route.cache_name) {
                names.push(route.cache_name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::StrategyKind;

    fn config_with(routes: Vec<Rule>) -> AppConfig {
        let mut config = AppConfig::default();
        config.sw.routes = routes;
        config
    }

    fn scenario_routes() -> Vec<Rule> {
        vec![
            Rule::new("/api/**", StrategyKind::NetworkFirst).with_cache("api").with_max_age(300),
            Rule::new("*.png", StrategyKind::CacheFirst).with_cache("images").with_max_entries(2),
            Rule::new("/**", StrategyKind::StaleWhileRevalidate),
        ]
    }

    #[test]
    fn test_first_match_wins() {
        let program = Program::compile(&config_with(scenario_routes()), Vec::new()).unwrap();
        assert_eq!(program.route_for("/api/logo.png").unwrap().index, 0);
        assert_eq!(program.route_for("/img/logo.png").unwrap().index, 1);
        assert_eq!(program.route_for("/about").unwrap().index, 2);
    }

    #[test]
    fn test_no_match_without_catch_all() {
        let routes = vec![Rule::new("/api/**", StrategyKind::NetworkOnly)];
        let program = Program::compile(&config_with(routes), Vec::new()).unwrap();
        assert!(program.route_for("/index.html").is_none());
    }

    #[test]
    fn test_every_bad_route_is_reported() {
        let routes = vec![
            Rule::new("/ok/**", StrategyKind::CacheFirst),
            Rule::new("/a/{b", StrategyKind::CacheFirst),
            Rule::new("/c}", StrategyKind::CacheFirst),
        ];
        match Program::compile(&config_with(routes), Vec::new()) {
            Err(Error::InvalidRoutes(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].index, 1);
                assert_eq!(errors[0].pattern, "/a/{b");
                assert_eq!(errors[1].index, 2);
            }
            other => panic!("expected InvalidRoutes, got {other:?}"),
        }
    }

    #[test]
    fn test_text_round_trip_resolves_cache_names() {
        let program = Program::compile(&config_with(scenario_routes()), vec!["/".into(), "/app.js".into()]).unwrap();
        let text = program.to_text().unwrap();
        assert!(text.contains("rt-stalewhilerevalidate"));

        let loaded = Program::from_text(&text).unwrap();
        assert_eq!(loaded.routes().len(), 3);
        assert_eq!(loaded.routes()[2].cache_name, "rt-stalewhilerevalidate");
        assert_eq!(loaded.precache().urls, vec!["/", "/app.js"]);
        assert_eq!(loaded.precache().cache_name, PRECACHE_NAME);
        assert_eq!(loaded.origin(), program.origin());
    }

    #[test]
    fn test_from_text_rejects_bad_pattern() {
        let program = Program::compile(&config_with(scenario_routes()), Vec::new()).unwrap();
        let tampered = program.to_text().unwrap().replace("/api/**", "/api/{x");
        assert!(matches!(Program::from_text(&tampered), Err(Error::InvalidRoutes(_))));
    }

    #[test]
    fn test_rule_list_invariants_hold_on_every_path() {
        let routes = vec![
            Rule::new("/**", StrategyKind::StaleWhileRevalidate),
            Rule::new("/api/**", StrategyKind::NetworkFirst).with_max_entries(0),
        ];
        match Program::compile(&config_with(routes), Vec::new()) {
            Err(Error::InvalidRoutes(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!((errors[0].index, errors[0].pattern.as_str()), (0, "/**"));
                assert_eq!(errors[1].index, 1);
                assert!(errors[1].reason.contains("max_entries"));
            }
            other => panic!("expected InvalidRoutes, got {other:?}"),
        }

        let program = Program::compile(&config_with(scenario_routes()), Vec::new()).unwrap();
        let text = program.to_text().unwrap();
        let unbounded = text.replace("\"max_entries\": 2", "\"max_entries\": 0");
        assert_ne!(unbounded, text);
        assert!(matches!(Program::from_text(&unbounded), Err(Error::InvalidRoutes(_))));

        let shadowing = text.replace("\"match\": \"/api/**\"", "\"match\": \"/**\"");
        assert_ne!(shadowing, text);
        assert!(matches!(Program::from_text(&shadowing), Err(Error::InvalidRoutes(_))));
    }

    #[test]
    fn test_from_text_rejects_unknown_version() {
        let program = Program::compile(&config_with(scenario_routes()), Vec::new()).unwrap();
        let text = program.to_text().unwrap().replace("\"version\": 1", "\"version\": 99");
        assert!(matches!(Program::from_text(&text), Err(Error::Program(_))));
    }

    #[test]
    fn test_cache_names_are_distinct_and_skip_network_only() {
        let routes = vec![
            Rule::new("/a/**", StrategyKind::CacheFirst).with_cache("shared"),
            Rule::new("/b/**", StrategyKind::NetworkFirst).with_cache("shared"),
            Rule::new("/c/**", StrategyKind::NetworkOnly),
            Rule::new("/**", StrategyKind::StaleWhileRevalidate),
        ];
        let program = Program::compile(&config_with(routes), Vec::new()).unwrap();
        assert_eq!(program.cache_names(), vec!["shared", "rt-stalewhilerevalidate"]);
    }
}

//! First-match request dispatch.
//!
//! Routes are evaluated in declaration order and the first route whose
//! pattern matches the request path handles it; later routes are never
//! consulted. Requests that are not GET over http(s), or that match no
//! route, pass through untouched.

use std::collections::BTreeMap;

use pwakit_core::{CacheDb, CacheStore, CompiledRoute, Program, Request, Response, StrategyKind};

use crate::strategies::{Context, Served, Source, Strategy};

struct Route {
    compiled: CompiledRoute,
    strategy: Strategy,
}

/// Result of an intercepted request.
#[derive(Debug, Clone)]
pub struct Handled {
    /// Index of the route that handled the request.
    pub route: usize,
    pub strategy: StrategyKind,
    pub response: Response,
    pub source: Source,
}

/// Owns the route table and a handle to every store it references.
pub struct Dispatcher {
    routes: Vec<Route>,
    stores: BTreeMap<String, CacheStore>,
    ctx: Context,
}

impl Dispatcher {
    pub fn new(program: &Program, db: &CacheDb, ctx: Context) -> Self {
        let stores: BTreeMap<String, CacheStore> = program
            .cache_names()
            .into_iter()
            .chain([program.precache().cache_name.clone()])
            .map(|name| (name.clone(), db.store(name)))
            .collect();

        let routes = program
            .routes()
            .iter()
            .map(|compiled| {
                // NetworkOnly routes never touch their store, so it is not registered.
                let store =
                    stores.get(&compiled.cache_name).cloned().unwrap_or_else(|| db.store(compiled.cache_name.clone()));
                Route { compiled: compiled.clone(), strategy: Strategy::for_route(compiled, store) }
            })
            .collect();

        Self { routes, stores, ctx }
    }

    /// Handle one intercepted request. `None` means pass through.
    ///
    /// Never fails: executor errors become synthesized responses.
    pub async fn dispatch(&self, request: &Request) -> Option<Handled> {
        if !request.is_interceptable() {
            tracing::trace!(method = %request.method, url = %request.url, "pass through");
            return None;
        }

        let path = request.path();
        let Some(route) = self.routes.iter().find(|route| route.compiled.matches(path)) else {
            tracing::debug!(path, "no route matched");
            return None;
        };

        let kind = route.strategy.kind();
        tracing::debug!(path, route = route.compiled.index, strategy = %kind, "dispatch");

        let served = match route.strategy.handle(&self.ctx, request).await {
            Ok(served) => served,
            Err(err) if err.is_network() => {
                tracing::debug!(url = %request.url, error = %err, "network failure");
                Served::synthesized(Response::network_error())
            }
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "store failure");
                Served::synthesized(Response::store_error())
            }
        };

        Some(Handled { route: route.compiled.index, strategy: kind, response: served.response, source: served.source })
    }

    /// The route that would handle `path`, if any.
    pub fn route_for(&self, path: &str) -> Option<&CompiledRoute> {
        self.routes.iter().map(|route| &route.compiled).find(|compiled| compiled.matches(path))
    }

    pub fn store(&self, name: &str) -> Option<&CacheStore> {
        self.stores.get(name)
    }

    /// Every store the program reads or writes, by name.
    pub fn stores(&self) -> &BTreeMap<String, CacheStore> {
        &self.stores
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, ScriptedNetwork, memory_db, program, request, url};
    use http::{Method, StatusCode};
    use proptest::prelude::*;
    use pwakit_core::{PRECACHE_NAME, Rule};

    fn scenario() -> Vec<Rule> {
        vec![
            Rule::new("/api/**", StrategyKind::NetworkFirst).with_cache("api").with_max_age(300),
            Rule::new("*.png", StrategyKind::CacheFirst).with_cache("images").with_max_entries(2),
            Rule::new("/**", StrategyKind::StaleWhileRevalidate),
        ]
    }

    async fn setup(rules: Vec<Rule>) -> (Dispatcher, std::sync::Arc<ScriptedNetwork>) {
        let db = memory_db().await;
        let network = ScriptedNetwork::new();
        let ctx = Context::new(network.clone(), ManualClock::new());
        (Dispatcher::new(&program(rules, vec![]), &db, ctx), network)
    }

    #[tokio::test]
    async fn test_end_to_end_image_eviction() {
        let (dispatcher, network) = setup(scenario()).await;
        for path in ["/a.png", "/b.png", "/c.png"] {
            network.respond(path, path);
            let handled = dispatcher.dispatch(&request(path)).await.unwrap();
            assert_eq!(handled.route, 1);
            assert_eq!(handled.strategy, StrategyKind::CacheFirst);
            assert_eq!(handled.response.status, StatusCode::OK);
        }

        let images = dispatcher.store("images").unwrap();
        assert_eq!(images.urls().await.unwrap(), vec![url("/b.png").to_string(), url("/c.png").to_string()]);
    }

    #[tokio::test]
    async fn test_api_png_goes_to_earlier_rule() {
        let (dispatcher, network) = setup(scenario()).await;
        network.respond("/api/logo.png", "json");

        let handled = dispatcher.dispatch(&request("/api/logo.png")).await.unwrap();
        assert_eq!(handled.route, 0);
        assert_eq!(handled.strategy, StrategyKind::NetworkFirst);
        assert!(dispatcher.store("images").unwrap().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_non_get_passes_through() {
        let (dispatcher, network) = setup(scenario()).await;
        let mut post = request("/api/users");
        post.method = Method::POST;

        assert!(dispatcher.dispatch(&post).await.is_none());
        assert_eq!(network.calls("/api/users"), 0);
    }

    #[tokio::test]
    async fn test_non_http_passes_through() {
        let (dispatcher, _network) = setup(scenario()).await;
        let ext = Request::new(Method::GET, url::Url::parse("chrome-extension://abc/a.png").unwrap());
        assert!(dispatcher.dispatch(&ext).await.is_none());
    }

    #[tokio::test]
    async fn test_unmatched_passes_through() {
        let (dispatcher, _network) = setup(vec![Rule::new("/api/**", StrategyKind::NetworkOnly)]).await;
        assert!(dispatcher.dispatch(&request("/index.html")).await.is_none());
    }

    #[tokio::test]
    async fn test_network_only_failure_becomes_408() {
        let (dispatcher, network) = setup(vec![Rule::new("/live/**", StrategyKind::NetworkOnly)]).await;
        network.fail("/live/feed");

        let handled = dispatcher.dispatch(&request("/live/feed")).await.unwrap();
        assert_eq!(handled.response, Response::network_error());
        assert_eq!(handled.source, Source::Synthesized);
    }

    #[tokio::test]
    async fn test_store_failure_is_500_and_serving_continues() {
        let db = memory_db().await;
        let network = ScriptedNetwork::new();
        network.respond("/img/a.png", "png");
        network.respond("/live/feed", "feed");
        let rules = vec![
            Rule::new("/live/**", StrategyKind::NetworkOnly),
            Rule::new("*.png", StrategyKind::CacheFirst).with_cache("images"),
        ];
        let ctx = Context::new(network.clone(), ManualClock::new());
        let dispatcher = Dispatcher::new(&program(rules, vec![]), &db, ctx);
        db.close().await.unwrap();

        let handled = dispatcher.dispatch(&request("/img/a.png")).await.unwrap();
        assert_eq!(handled.response, Response::store_error());
        assert_eq!(handled.source, Source::Synthesized);
        assert_eq!(network.calls("/img/a.png"), 0);

        let live = dispatcher.dispatch(&request("/live/feed")).await.unwrap();
        assert_eq!(live.source, Source::Network);
        assert_eq!(live.response.body, "feed");

        let again = dispatcher.dispatch(&request("/img/a.png")).await.unwrap();
        assert_eq!(again.response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_stores_include_precache_and_skip_network_only() {
        let (dispatcher, _network) = setup(vec![
            Rule::new("/live/**", StrategyKind::NetworkOnly),
            Rule::new("/**", StrategyKind::CacheFirst).with_cache("pages"),
        ])
        .await;

        let names: Vec<&str> = dispatcher.stores().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["pages", PRECACHE_NAME]);
    }

    #[tokio::test]
    async fn test_shared_store_name_shares_entries() {
        let (dispatcher, network) = setup(vec![
            Rule::new("/a/**", StrategyKind::CacheFirst).with_cache("shared").with_max_entries(1),
            Rule::new("/b/**", StrategyKind::CacheFirst).with_cache("shared"),
        ])
        .await;
        network.respond("/a/1", "a");
        network.respond("/b/1", "b");

        dispatcher.dispatch(&request("/b/1")).await.unwrap();
        dispatcher.dispatch(&request("/a/1")).await.unwrap();
        assert_eq!(dispatcher.store("shared").unwrap().urls().await.unwrap(), vec![url("/a/1").to_string()]);
    }

    const PATHS: &[&str] = &["/api/users", "/img/a.png", "/a.png", "/fonts/x.woff2", "/about", "/"];
    const PATTERNS: &[&str] = &["/api/**", "*.png", "/img/**", "*.{woff,woff2}", "/about", "/**"];

    proptest! {
        #[test]
        fn prop_first_match_law(picks in proptest::collection::vec(0..PATTERNS.len(), 1..6), path in 0..PATHS.len()) {
            let rules: Vec<Rule> =
                picks.iter().map(|&i| Rule::new(PATTERNS[i], StrategyKind::NetworkOnly)).collect();
            let path = PATHS[path];
            let expected = rules
                .iter()
                .position(|rule| pwakit_core::Pattern::compile(&rule.pattern).unwrap().matches(path));

            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let handled = runtime.block_on(async {
                let (dispatcher, network) = setup(rules).await;
                network.respond(path, "ok");
                dispatcher.dispatch(&request(path)).await
            });

            prop_assert_eq!(handled.map(|h| h.route), expected);
        }
    }
}

//! In-process doubles for the network and the clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use http::{HeaderValue, StatusCode, header};
use pwakit_core::config::AppConfig;
use pwakit_core::{CacheDb, Clock, Error, Network, Program, Request, Response, Rule};

pub(crate) const ORIGIN: &str = "https://app.test";

#[derive(Clone)]
pub(crate) enum Script {
    Respond(Response),
    Fail,
    Hang,
    Delay(Duration, Response),
}

/// A [`Network`] that answers by request path.
///
/// Unscripted paths fail like an unreachable host.
#[derive(Default)]
pub(crate) struct ScriptedNetwork {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn script(&self, path: &str, script: Script) {
        self.scripts.lock().unwrap().insert(path.to_string(), script);
    }

    pub(crate) fn respond(&self, path: &str, body: &str) {
        self.script(path, Script::Respond(text(StatusCode::OK, body)));
    }

    pub(crate) fn respond_status(&self, path: &str, status: StatusCode) {
        self.script(path, Script::Respond(text(status, "")));
    }

    pub(crate) fn fail(&self, path: &str) {
        self.script(path, Script::Fail);
    }

    pub(crate) fn hang(&self, path: &str) {
        self.script(path, Script::Hang);
    }

    pub(crate) fn delay(&self, path: &str, by: Duration, body: &str) {
        self.script(path, Script::Delay(by, text(StatusCode::OK, body)));
    }

    pub(crate) fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let path = request.path().to_string();
        *self.calls.lock().unwrap().entry(path.clone()).or_default() += 1;
        let script = self.scripts.lock().unwrap().get(&path).cloned();

        match script {
            Some(Script::Respond(response)) => Ok(response),
            Some(Script::Delay(by, response)) => {
                tokio::time::sleep(by).await;
                Ok(response)
            }
            Some(Script::Hang) => std::future::pending().await,
            Some(Script::Fail) | None => Err(Error::Network(format!("connection refused: {path}"))),
        }
    }
}

/// A [`Clock`] that only moves when told to.
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn new() -> Arc<Self> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
        Arc::new(Self { now: Mutex::new(start) })
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub(crate) fn text(status: StatusCode, body: &str) -> Response {
    let mut response = Response::new(status, body.to_string());
    response.headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

pub(crate) fn request(path: &str) -> Request {
    Request::get(&format!("{ORIGIN}{path}")).unwrap()
}

pub(crate) fn url(path: &str) -> url::Url {
    url::Url::parse(&format!("{ORIGIN}{path}")).unwrap()
}

pub(crate) fn program(routes: Vec<Rule>, precache: Vec<&str>) -> Program {
    let mut config = AppConfig { origin: ORIGIN.to_string(), ..AppConfig::default() };
    config.sw.routes = routes;
    Program::compile(&config, precache.into_iter().map(String::from).collect()).unwrap()
}

pub(crate) async fn memory_db() -> CacheDb {
    CacheDb::open_in_memory().await.unwrap()
}

//! The long-lived worker for one origin.
//!
//! Lifecycle: `Parsed -> Installing -> Installed -> Activating -> Activated`.
//! A failed install returns to `Parsed` so the host can retry it in full.
//! Requests are only intercepted once the worker is `Activated`; before that
//! every fetch passes through.

use std::sync::{Arc, Mutex, PoisonError};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use pwakit_core::{CacheDb, CacheStore, Clock, Error, Network, Program, Request, SystemClock};

use crate::background::Background;
use crate::dispatch::{Dispatcher, Handled};
use crate::notifications::{ClickOutcome, Clients, NotificationHost, Notifications, RecordingHost, ShownNotification};
use crate::precache;
use crate::strategies::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        };
        f.write_str(name)
    }
}

pub struct WorkerBuilder {
    program: Program,
    db: CacheDb,
    network: Arc<dyn Network>,
    clock: Arc<dyn Clock>,
    host: Option<(Arc<dyn NotificationHost>, Arc<dyn Clients>)>,
}

impl WorkerBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Where notifications are shown and windows focused or opened.
    ///
    /// Defaults to an in-memory [`RecordingHost`].
    pub fn notification_host(mut self, host: Arc<dyn NotificationHost>, clients: Arc<dyn Clients>) -> Self {
        self.host = Some((host, clients));
        self
    }

    pub fn build(self) -> Worker {
        let ctx = Context::new(self.network, self.clock);
        let dispatcher = Dispatcher::new(&self.program, &self.db, ctx);

        let notifications = self.program.notifications().enabled.then(|| {
            let (host, clients) = self.host.unwrap_or_else(|| {
                let recording = Arc::new(RecordingHost::new());
                (recording.clone() as Arc<dyn NotificationHost>, recording as Arc<dyn Clients>)
            });
            Notifications::new(self.program.notifications().clone(), self.program.origin().clone(), host, clients)
        });

        Worker { program: self.program, dispatcher, notifications, state: Mutex::new(WorkerState::Parsed) }
    }
}

pub struct Worker {
    program: Program,
    dispatcher: Dispatcher,
    notifications: Option<Notifications>,
    state: Mutex<WorkerState>,
}

impl Worker {
    pub fn builder(program: Program, db: CacheDb, network: Arc<dyn Network>) -> WorkerBuilder {
        WorkerBuilder { program, db, network, clock: Arc::new(SystemClock), host: None }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from `from` to `to`, or fail without changing state.
    fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return Err(Error::InvalidState(format!("cannot move to {to} from {}", *state)));
        }
        tracing::info!(from = %from, to = %to, "worker state");
        *state = to;
        Ok(())
    }

    fn set_state(&self, to: WorkerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = to;
        tracing::info!(to = %to, "worker state");
    }

    /// Install hook: precache every manifest URL, all or nothing.
    ///
    /// Returns the number of URLs stored.
    pub async fn install(&self) -> Result<usize, Error> {
        self.transition(WorkerState::Parsed, WorkerState::Installing)?;

        let manifest = self.program.precache();
        let result = match self.dispatcher.store(&manifest.cache_name) {
            Some(store) => {
                precache::install(self.dispatcher.context().network.as_ref(), self.program.origin(), manifest, store)
                    .await
            }
            None => Err(Error::UnknownCache(manifest.cache_name.clone())),
        };

        match result {
            Ok(count) => {
                self.set_state(WorkerState::Installed);
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "install failed");
                self.set_state(WorkerState::Parsed);
                Err(err)
            }
        }
    }

    /// Activate hook. No legacy store cleanup is performed.
    pub async fn activate(&self) -> Result<(), Error> {
        self.transition(WorkerState::Installed, WorkerState::Activating)?;
        tracing::debug!(stores = ?self.dispatcher.stores().keys().collect::<Vec<_>>(), "activating");
        self.transition(WorkerState::Activating, WorkerState::Activated)
    }

    /// Fetch hook. `None` means the request passes through to the network
    /// untouched.
    pub async fn fetch(&self, request: &Request) -> Option<Handled> {
        if self.state() != WorkerState::Activated {
            tracing::trace!(url = %request.url, state = %self.state(), "not active, pass through");
            return None;
        }
        self.dispatcher.dispatch(request).await
    }

    /// Push hook. Returns the notification shown, if any.
    pub async fn push(&self, payload: Option<&[u8]>) -> Result<Option<ShownNotification>, Error> {
        match &self.notifications {
            Some(notifications) => notifications.receive(payload).await,
            None => {
                tracing::debug!("notifications disabled, push ignored");
                Ok(None)
            }
        }
    }

    /// Notification-click hook.
    pub async fn notification_click(&self, shown: &ShownNotification) -> Result<ClickOutcome, Error> {
        match &self.notifications {
            Some(notifications) => notifications.click(shown).await,
            None => Err(Error::Notification("notifications are disabled".to_string())),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self, name: &str) -> Option<&CacheStore> {
        self.dispatcher.store(name)
    }

    pub fn notifications(&self) -> Option<&Notifications> {
        self.notifications.as_ref()
    }

    pub fn background(&self) -> &Background {
        &self.dispatcher.context().background
    }

    /// Wait for detached refreshes and write-throughs to finish.
    pub async fn drain(&self) {
        self.background().drain().await;
    }
}

//! Seams to the environment that displays notifications and owns windows.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use pwakit_core::Error;

use super::payload::Notification;

/// A notification the host has displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShownNotification {
    pub id: u64,
    pub notification: Notification,
    /// False once closed.
    pub open: bool,
}

/// An open window or tab of the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WindowClient {
    pub id: u64,
    pub url: String,
    pub focused: bool,
}

#[async_trait]
pub trait NotificationHost: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<ShownNotification, Error>;
    async fn close(&self, id: u64) -> Result<(), Error>;
}

#[async_trait]
pub trait Clients: Send + Sync {
    async fn match_all(&self) -> Result<Vec<WindowClient>, Error>;
    async fn focus(&self, id: u64) -> Result<WindowClient, Error>;
    async fn open_window(&self, url: &Url) -> Result<WindowClient, Error>;
}

#[derive(Debug, Default)]
struct Recorded {
    next_id: u64,
    notifications: Vec<ShownNotification>,
    clients: Vec<WindowClient>,
}

impl Recorded {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`NotificationHost`] and [`Clients`].
///
/// Keeps every notification it was asked to show and tracks windows it
/// opened or was seeded with.
#[derive(Debug, Default)]
pub struct RecordingHost {
    state: Mutex<Recorded>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-open window.
    pub fn add_client(&self, url: impl Into<String>) -> WindowClient {
        let mut state = self.lock();
        let client = WindowClient { id: state.next_id(), url: url.into(), focused: false };
        state.clients.push(client.clone());
        client
    }

    /// Every notification shown so far, oldest first.
    pub fn notifications(&self) -> Vec<ShownNotification> {
        self.lock().notifications.clone()
    }

    pub fn clients(&self) -> Vec<WindowClient> {
        self.lock().clients.clone()
    }

    /// The most recent notification shown with `tag`.
    pub fn find_by_tag(&self, tag: &str) -> Option<ShownNotification> {
        self.lock().notifications.iter().rev().find(|n| n.notification.options.tag.as_deref() == Some(tag)).cloned()
    }

    pub fn find(&self, id: u64) -> Option<ShownNotification> {
        self.lock().notifications.iter().find(|n| n.id == id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NotificationHost for RecordingHost {
    async fn show(&self, notification: &Notification) -> Result<ShownNotification, Error> {
        let mut state = self.lock();

        // A notification with the same tag replaces the one on screen.
        if let Some(tag) = notification.options.tag.as_deref() {
            for shown in state.notifications.iter_mut() {
                if shown.open && shown.notification.options.tag.as_deref() == Some(tag) {
                    shown.open = false;
                }
            }
        }

        let shown = ShownNotification { id: state.next_id(), notification: notification.clone(), open: true };
        state.notifications.push(shown.clone());
        Ok(shown)
    }

    async fn close(&self, id: u64) -> Result<(), Error> {
        let mut state = self.lock();
        let shown = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::Notification(format!("no notification with id {id}")))?;
        shown.open = false;
        Ok(())
    }
}

#[async_trait]
impl Clients for RecordingHost {
    async fn match_all(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.clients())
    }

    async fn focus(&self, id: u64) -> Result<WindowClient, Error> {
        let mut state = self.lock();
        if !state.clients.iter().any(|c| c.id == id) {
            return Err(Error::Notification(format!("no window with id {id}")));
        }

        let mut focused = None;
        for client in state.clients.iter_mut() {
            client.focused = client.id == id;
            if client.focused {
                focused = Some(client.clone());
            }
        }
        focused.ok_or_else(|| Error::Notification(format!("no window with id {id}")))
    }

    async fn open_window(&self, url: &Url) -> Result<WindowClient, Error> {
        let mut state = self.lock();
        for client in state.clients.iter_mut() {
            client.focused = false;
        }
        let client = WindowClient { id: state.next_id(), url: url.to_string(), focused: true };
        state.clients.push(client.clone());
        Ok(client)
    }
}

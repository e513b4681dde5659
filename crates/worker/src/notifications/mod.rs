//! Push notification subsystem.
//!
//! Two triggers, independent of the fetch path:
//! - receive: decode the push payload (falling back to plain text) and show it
//! - click: close the notification and focus or open a window at its target

mod click;
mod host;
mod payload;

use std::sync::Arc;

use url::Url;

use pwakit_core::Error;
use pwakit_core::config::NotificationsConfig;

pub use click::{ClickOutcome, handle_click};
pub use host::{Clients, NotificationHost, RecordingHost, ShownNotification, WindowClient};
pub use payload::{FALLBACK_TITLE, Notification, NotificationAction, NotificationOptions, NotificationPayload};

pub struct Notifications {
    settings: NotificationsConfig,
    origin: Url,
    host: Arc<dyn NotificationHost>,
    clients: Arc<dyn Clients>,
}

impl Notifications {
    pub fn new(
        settings: NotificationsConfig, origin: Url, host: Arc<dyn NotificationHost>, clients: Arc<dyn Clients>,
    ) -> Self {
        Self { settings, origin, host, clients }
    }

    /// Handle a push event. A push without payload shows nothing.
    pub async fn receive(&self, raw: Option<&[u8]>) -> Result<Option<ShownNotification>, Error> {
        let Some(raw) = raw else {
            tracing::debug!("push without payload ignored");
            return Ok(None);
        };

        let notification = Notification::from_payload(NotificationPayload::decode(raw), &self.settings);
        let shown = self.host.show(&notification).await?;
        tracing::info!(id = shown.id, title = %shown.notification.title, "notification shown");
        Ok(Some(shown))
    }

    pub async fn click(&self, shown: &ShownNotification) -> Result<ClickOutcome, Error> {
        handle_click(self.host.as_ref(), self.clients.as_ref(), &self.origin, shown).await
    }

    pub fn settings(&self) -> &NotificationsConfig {
        &self.settings
    }
}

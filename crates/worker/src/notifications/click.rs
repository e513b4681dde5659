//! Focus-or-open click handling.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use pwakit_core::Error;

use super::host::{Clients, NotificationHost, ShownNotification, WindowClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "outcome", content = "client", rename_all = "snake_case")]
pub enum ClickOutcome {
    Focused(WindowClient),
    Opened(WindowClient),
}

impl ClickOutcome {
    pub fn client(&self) -> &WindowClient {
        match self {
            ClickOutcome::Focused(client) | ClickOutcome::Opened(client) => client,
        }
    }
}

/// Close the notification, then focus a window already at its target URL
/// or open a new one there.
pub async fn handle_click(
    host: &dyn NotificationHost, clients: &dyn Clients, origin: &Url, shown: &ShownNotification,
) -> Result<ClickOutcome, Error> {
    host.close(shown.id).await?;

    let raw = shown.notification.target_url();
    let target = pwakit_client::resolve(origin, raw).map_err(|e| Error::Notification(format!("{raw}: {e}")))?;

    let open = clients.match_all().await?;
    if let Some(existing) = open.iter().find(|client| same_url(&client.url, &target)) {
        tracing::debug!(client = existing.id, url = %target, "focusing existing window");
        return clients.focus(existing.id).await.map(ClickOutcome::Focused);
    }

    tracing::debug!(url = %target, "opening new window");
    clients.open_window(&target).await.map(ClickOutcome::Opened)
}

fn same_url(client_url: &str, target: &Url) -> bool {
    pwakit_client::canonicalize(client_url).is_ok_and(|url| url == *target)
}

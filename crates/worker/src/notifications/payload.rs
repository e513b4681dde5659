//! Push payload decoding and notification construction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pwakit_core::config::NotificationsConfig;

/// Title used when a payload cannot be decoded.
pub const FALLBACK_TITLE: &str = "Notification";

/// Decoded push payload. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub data: Option<Value>,
    pub actions: Option<Vec<NotificationAction>>,
    pub tag: Option<String>,
    pub renotify: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NotificationPayload {
    /// Decode raw push bytes.
    ///
    /// A JSON object is read field by field, so one mistyped field only loses
    /// that field. Anything else degrades to a plain-text body under the
    /// generic title rather than being dropped.
    pub fn decode(raw: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            Ok(_) => Self::text(raw),
            Err(err) => {
                tracing::debug!(error = %err, "push payload is not JSON, using text fallback");
                Self::text(raw)
            }
        }
    }

    fn text(raw: &[u8]) -> Self {
        Self {
            title: Some(FALLBACK_TITLE.to_string()),
            body: Some(String::from_utf8_lossy(raw).into_owned()),
            ..Self::default()
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let actions = fields.get("actions").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<NotificationAction>(item.clone()).ok())
                .collect()
        });

        Self {
            title: scalar(fields, "title"),
            body: scalar(fields, "body"),
            icon: scalar(fields, "icon"),
            badge: scalar(fields, "badge"),
            data: fields.get("data").filter(|v| !v.is_null()).cloned(),
            actions,
            tag: scalar(fields, "tag"),
            renotify: fields.get("renotify").and_then(Value::as_bool),
        }
    }
}

/// A string field, accepting numbers and booleans as their text.
fn scalar(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            tracing::debug!(field = key, value = %other, "ignoring push payload field");
            None
        }
    }
}

/// Display options for one notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub data: Value,
    pub actions: Vec<NotificationAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub renotify: bool,
}

/// A notification ready to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

impl Notification {
    /// Fill the payload's gaps from the configured defaults.
    pub fn from_payload(payload: NotificationPayload, settings: &NotificationsConfig) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            options: NotificationOptions {
                body: payload.body.unwrap_or_default(),
                icon: payload.icon.unwrap_or_else(|| settings.default_icon.clone()),
                badge: payload.badge.unwrap_or_else(|| settings.badge.clone()),
                data: payload.data.unwrap_or_else(|| Value::Object(Map::new())),
                actions: payload.actions.unwrap_or_default(),
                tag: payload.tag,
                renotify: payload.renotify.unwrap_or(false),
            },
        }
    }

    /// Site-relative or absolute URL a click should bring up.
    pub fn target_url(&self) -> &str {
        self.options.data.get("url").and_then(Value::as_str).unwrap_or("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_structured_payload() {
        let raw = br#"{"title":"Order shipped","body":"Track it","data":{"url":"/orders/7"},"tag":"order-7"}"#;
        let payload = NotificationPayload::decode(raw);
        assert_eq!(payload.title.as_deref(), Some("Order shipped"));
        assert_eq!(payload.tag.as_deref(), Some("order-7"));
        assert_eq!(payload.data, Some(json!({"url": "/orders/7"})));
    }

    #[test]
    fn test_decode_plain_text_falls_back() {
        let payload = NotificationPayload::decode(b"Server restarted");
        assert_eq!(payload.title.as_deref(), Some(FALLBACK_TITLE));
        assert_eq!(payload.body.as_deref(), Some("Server restarted"));
    }

    #[test]
    fn test_decode_non_object_json_falls_back() {
        let payload = NotificationPayload::decode(b"42");
        assert_eq!(payload.title.as_deref(), Some(FALLBACK_TITLE));
        assert_eq!(payload.body.as_deref(), Some("42"));
    }

    #[test]
    fn test_decode_keeps_object_with_mistyped_fields() {
        let raw = br#"{"title":5,"body":"Build passed","renotify":"yes","data":{"url":"/ci"},
            "actions":[{"action":"open","title":"Open"},{"action":1}]}"#;
        let payload = NotificationPayload::decode(raw);

        assert_eq!(payload.title.as_deref(), Some("5"));
        assert_eq!(payload.body.as_deref(), Some("Build passed"));
        assert_eq!(payload.renotify, None);
        assert_eq!(payload.data, Some(json!({"url": "/ci"})));
        let actions = payload.actions.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "open");

        let payload = NotificationPayload::decode(br#"{"title":{"nested":true},"tag":"t"}"#);
        assert_eq!(payload.title, None);
        assert_eq!(payload.tag.as_deref(), Some("t"));
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let payload = NotificationPayload::decode(&[0x66, 0x6f, 0xff]);
        assert_eq!(payload.body.as_deref(), Some("fo\u{fffd}"));
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings = NotificationsConfig::default();
        let notification = Notification::from_payload(NotificationPayload::default(), &settings);

        assert_eq!(notification.title, FALLBACK_TITLE);
        assert_eq!(notification.options.body, "");
        assert_eq!(notification.options.icon, settings.default_icon);
        assert_eq!(notification.options.badge, settings.badge);
        assert_eq!(notification.options.data, json!({}));
        assert!(notification.options.actions.is_empty());
        assert_eq!(notification.options.tag, None);
        assert!(!notification.options.renotify);
        assert_eq!(notification.target_url(), "/");
    }

    #[test]
    fn test_payload_overrides_defaults() {
        let payload = NotificationPayload::decode(
            br#"{"icon":"/i.png","badge":"/b.png","renotify":true,"actions":[{"action":"open","title":"Open"}]}"#,
        );
        let notification = Notification::from_payload(payload, &NotificationsConfig::default());
        assert_eq!(notification.options.icon, "/i.png");
        assert_eq!(notification.options.badge, "/b.png");
        assert!(notification.options.renotify);
        assert_eq!(notification.options.actions[0].action, "open");
    }
}

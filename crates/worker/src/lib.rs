//! The pwakit runtime.
//!
//! A [`Worker`] is the long-lived, event-driven context for one origin. It
//! interprets a compiled [`pwakit_core::Program`] directly:
//!
//! - `install` fills the precache store, all or nothing
//! - `activate` turns on fetch interception
//! - `fetch` routes each GET request to the first matching rule's strategy
//! - `push` and `notification_click` drive the notification subsystem
//!
//! Rule order matters: the first route whose pattern matches a request's
//! path handles it, and later routes are never consulted.

pub mod background;
pub mod dispatch;
pub mod notifications;
pub mod precache;
pub mod strategies;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use background::Background;
pub use dispatch::{Dispatcher, Handled};
pub use notifications::{
    ClickOutcome, Clients, Notification, NotificationHost, NotificationPayload, Notifications, RecordingHost,
    ShownNotification, WindowClient,
};
pub use strategies::{Context, Served, Source, Strategy};
pub use worker::{Worker, WorkerBuilder, WorkerState};

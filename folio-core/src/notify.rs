//! User-facing notifications.
//!
//! Remote mutation outcomes surface as transient banner notifications, never
//! as fatal errors. Emitters hold a [`Notifier`] and fire-and-forget;
//! whoever drives the UI subscribes to the receiving end.

use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

/// Cloneable sending half of the notification channel.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Notifier { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(message.into(), NotificationLevel::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(message.into(), NotificationLevel::Error);
    }

    fn send(&self, message: String, level: NotificationLevel) {
        // No subscribers is fine; the banner is best-effort.
        let _ = self.tx.send(Notification { message, level });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

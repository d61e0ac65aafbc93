//! Typed events the core emits for user-visible feedback.
//!
//! The core never blocks on delivery. A `Notifier` hands each event to an
//! observer and moves on.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to an unbounded channel drained by an observer task.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            debug!("Notification dropped, observer is gone: {}", e.0.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::success("first", "a"));
        notifier.notify(Notification::error("second", "b"));

        assert_eq!(rx.recv().await.unwrap().title, "first");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.title, "second");
        assert_eq!(second.variant, NotificationVariant::Destructive);
    }

    #[test]
    fn test_channel_notifier_survives_dropped_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::success("ignored", ""));
    }

    #[test]
    fn test_variant_serializes_lowercase() {
        let json = serde_json::to_string(&Notification::error("t", "d")).unwrap();
        assert!(json.contains("\"destructive\""));
    }
}

/// Notification surface: transient messages shown to the operator
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub duration_ms: u64,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            duration_ms,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!("🔔 {}: {}", notification.title, notification.message);
    }
}

/// Fans notifications out to every subscribed front-end
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: &Notification) {
        // No subscribers is fine: nobody is looking
        let _ = self.tx.send(notification.clone());
    }
}

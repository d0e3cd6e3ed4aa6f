//! Notification Sinks
//!
//! Fire-and-forget delivery of toasts. The engine never waits on a sink
//! and ignores delivery failures.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::game::events::{Notification, NotificationKind};

/// Receiver of transient toasts.
pub trait NotificationSink: Send + Sync {
    /// Display a toast. Must not block.
    fn notify(&self, notification: Notification);
}

/// Writes toasts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                info!(duration_ms = notification.duration_ms, "toast: {}", notification.message)
            }
            NotificationKind::Info => {
                debug!(duration_ms = notification.duration_ms, "toast: {}", notification.message)
            }
        }
    }
}

/// Forwards toasts over an unbounded channel, in issuance order.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Create a sink and the receiver its toasts arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // Receiver gone means nobody is displaying toasts anymore
        let _ = self.tx.send(notification);
    }
}

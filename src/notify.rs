//! Notification sink for user-facing success and error messages.
//!
//! Stores never render anything themselves; they hand short messages to a
//! [`Notifier`] and the UI layer decides how to show them (toasts, a status
//! bar, ...).

use tokio::sync::mpsc;

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A message destined for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Receives user-facing messages from the stores.
pub trait Notifier: Send + Sync {
    /// Report a completed action.
    fn success(&self, message: &str);

    /// Report a failed action with a human-readable reason.
    fn error(&self, message: &str);
}

/// Forwards notifications to `tracing`.
///
/// Used when no UI sink is wired in, so failures still reach the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(text = message, "notify: success");
    }

    fn error(&self, message: &str) {
        tracing::warn!(text = message, "notify: error");
    }
}

/// Pushes notifications onto an unbounded channel for a UI task to drain.
///
/// Messages sent after the receiver is dropped are logged and discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the UI reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn push(&self, level: Level, message: &str) {
        let notification = Notification {
            level,
            message: message.to_string(),
        };
        if self.tx.send(notification).is_err() {
            tracing::debug!(text = message, "notification receiver dropped");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn success(&self, message: &str) {
        self.push(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

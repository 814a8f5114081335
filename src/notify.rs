//! Fire-and-forget user notifications.
//!
//! The editor reports copy/paste results and similar events through a
//! [`Notifier`]. Nothing in the editor depends on a notification being seen.

use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// An operation succeeded
    Success,
    /// Neutral information
    Info,
    /// An operation failed
    Error,
}

/// A short message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Human-readable message
    pub message: String,
}

impl Notification {
    /// Creates a success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Creates an informational notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Creates an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier {
    /// Delivers a notification.
    fn notify(&mut self, notification: Notification);
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => log::error!("{}", notification.message),
            NotificationLevel::Success | NotificationLevel::Info => {
                log::info!("{}", notification.message)
            }
        }
    }
}

/// Keeps every notification it receives, oldest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<&Notification> {
        self.entries.last()
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, notification: Notification) {
        self.entries.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_records_in_order() {
        let mut log = NotificationLog::new();
        log.notify(Notification::success("Copied 2 items"));
        log.notify(Notification::error("Save failed"));

        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.entries()[0].level, NotificationLevel::Success);
        assert_eq!(log.last().map(|n| n.message.as_str()), Some("Save failed"));
    }
}

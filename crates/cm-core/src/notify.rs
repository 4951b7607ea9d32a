//! User-facing notifications.

use std::fmt;

use crate::record::ActivityRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    /// An operation failed.
    Destructive,
}

/// A `{title, description, severity}` message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Receives notifications and log changes from a [`Tracker`](crate::Tracker).
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);

    /// Called with the full log after every change to it.
    fn log_changed(&mut self, _records: &[ActivityRecord]) {}
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for &mut T {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }

    fn log_changed(&mut self, records: &[ActivityRecord]) {
        (**self).log_changed(records);
    }
}

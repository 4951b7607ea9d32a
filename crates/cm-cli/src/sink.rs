//! Terminal notification output.

use cm_core::{ActivityRecord, Notification, NotificationSink, Severity};

/// Writes notifications to stderr so stdout carries only command output.
#[derive(Debug, Default)]
pub struct StderrSink {
    failed: bool,
}

impl StderrSink {
    /// Whether any destructive notification was reported.
    pub const fn failed(&self) -> bool {
        self.failed
    }
}

impl NotificationSink for StderrSink {
    fn notify(&mut self, notification: Notification) {
        if notification.severity == Severity::Destructive {
            self.failed = true;
        }
        eprintln!("{}", format_notification(&notification));
    }

    fn log_changed(&mut self, records: &[ActivityRecord]) {
        tracing::debug!(records = records.len(), "activity log changed");
    }
}

fn format_notification(notification: &Notification) -> String {
    match notification.severity {
        Severity::Info => notification.to_string(),
        Severity::Destructive => format!("error: {notification}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destructive_notifications_are_prefixed() {
        let n = Notification::destructive("Error", "Please select a student.");
        assert_eq!(format_notification(&n), "error: Error: Please select a student.");

        let n = Notification::info("Clear Successful", "Current activity log cleared.");
        assert_eq!(
            format_notification(&n),
            "Clear Successful: Current activity log cleared."
        );
    }

    #[test]
    fn failure_is_remembered() {
        let mut sink = StderrSink::default();
        sink.notify(Notification::info("Save Successful", "Activity log saved as a."));
        assert!(!sink.failed());
        sink.notify(Notification::destructive("Error", "Please select a log to load."));
        assert!(sink.failed());
    }
}

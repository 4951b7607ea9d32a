//! The operation boundary used by front ends.
//!
//! [`Tracker`] owns the activity log, roster and snapshot store over one
//! persistence backend. Each operation reports its outcome to a
//! [`NotificationSink`] and returns it as a typed result; nothing panics.

use std::ffi::OsStr;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::codec::render_log;
use crate::error::{Error, ErrorKind, Result};
use crate::log::ActivityLog;
use crate::notify::{Notification, NotificationSink};
use crate::record::ActivityRecord;
use crate::roster::Roster;
use crate::snapshot::SnapshotStore;
use crate::store::KeyValueStore;
use crate::time::Normalizer;
use crate::types::ValidationError;

pub struct Tracker<S, N> {
    log: ActivityLog<S>,
    roster: Roster<S>,
    snapshots: SnapshotStore<S>,
    sink: N,
}

impl<S, N> Tracker<S, N>
where
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    /// Opens all stores over `store`, normalizing against the local clock.
    pub fn open(store: S, sink: N, default_roster: &[String]) -> Result<Self> {
        Self::open_with(store, sink, default_roster, Normalizer::local())
    }

    pub fn open_with(
        store: S,
        sink: N,
        default_roster: &[String],
        normalizer: Normalizer,
    ) -> Result<Self> {
        let log = ActivityLog::open_with(store.clone(), normalizer)?;
        let roster = Roster::open(store.clone(), default_roster)?;
        let snapshots = SnapshotStore::open(store)?;
        Ok(Self {
            log,
            roster,
            snapshots,
            sink,
        })
    }

    pub const fn log(&self) -> &ActivityLog<S> {
        &self.log
    }

    pub fn records(&self) -> &[ActivityRecord] {
        self.log.records()
    }

    pub fn roster(&self) -> &[String] {
        self.roster.names()
    }

    /// True if `name` is on the roster.
    pub fn on_roster(&self, name: &str) -> bool {
        self.roster.contains(name)
    }

    pub fn saved_logs(&self) -> &[String] {
        self.snapshots.list()
    }

    pub fn is_open(&self, subject: &str) -> bool {
        self.log.is_open(subject)
    }

    pub const fn normalizer(&self) -> &Normalizer {
        self.log.normalizer()
    }

    pub const fn sink(&self) -> &N {
        &self.sink
    }

    pub fn check_out(
        &mut self,
        subject: &str,
        destination: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityRecord> {
        match self.log.check_out(subject, destination, now) {
            Ok(record) => {
                let record = record.clone();
                let time = record.check_out_instant.display(self.log.normalizer());
                self.sink.notify(Notification::info(
                    "Check-out Successful",
                    format!("{subject} checked out to {destination} at {time}."),
                ));
                self.sink.log_changed(self.log.records());
                Ok(record)
            }
            Err(e @ Error::Validation(_)) => Err(self.fail(e, "Please select a student.")),
            Err(e) => Err(self.fail_with_message(e)),
        }
    }

    /// Checks `subject` in at `now`.
    ///
    /// A blank subject is reported as a missing selection before the log is
    /// consulted.
    pub fn check_in(&mut self, subject: &str, now: DateTime<Utc>) -> Result<ActivityRecord> {
        if subject.trim().is_empty() {
            let e = ValidationError::Empty { field: "subject" }.into();
            return Err(self.fail(e, "Please select a student."));
        }
        match self.log.check_in(subject, now) {
            Ok(record) => {
                let record = record.clone();
                let time = record.display_time(self.log.normalizer());
                self.sink.notify(Notification::info(
                    "Check-in Successful",
                    format!("{subject} checked in at {time}."),
                ));
                self.sink.log_changed(self.log.records());
                Ok(record)
            }
            Err(e @ Error::NoOpenRecord { .. }) => Err(self.fail(
                e,
                "No active check-out found for this student.",
            )),
            Err(e) => Err(self.fail_with_message(e)),
        }
    }

    /// Clears the current log. Saved snapshots are kept.
    pub fn clear_log(&mut self) -> Result<()> {
        match self.log.clear() {
            Ok(()) => {
                self.sink.notify(Notification::info(
                    "Clear Successful",
                    "Current activity log cleared.",
                ));
                self.sink.log_changed(self.log.records());
                Ok(())
            }
            Err(e) => Err(self.fail_with_message(e)),
        }
    }

    /// Saves the current log under `name`.
    pub fn save_log(&mut self, name: &str) -> Result<()> {
        match self.snapshots.save(name, self.log.records()) {
            Ok(name) => {
                self.sink.notify(Notification::info(
                    "Save Successful",
                    format!("Activity log saved as {name}."),
                ));
                Ok(())
            }
            Err(e @ Error::Validation(_)) => Err(self.fail(
                e,
                "Please enter a name for the saved log.",
            )),
            Err(e) => Err(self.fail_with_message(e)),
        }
    }

    /// Replaces the current log with the snapshot saved under `name`.
    pub fn load_log(&mut self, name: &str) -> Result<()> {
        let result = self
            .snapshots
            .load(name)
            .and_then(|records| self.log.load(records));
        match result {
            Ok(()) => {
                self.sink.notify(Notification::info(
                    "Load Successful",
                    format!("Activity log \"{name}\" loaded."),
                ));
                self.sink.log_changed(self.log.records());
                Ok(())
            }
            Err(e) => Err(self.snapshot_read_failure(e, name)),
        }
    }

    /// Adds records from the snapshot under `name` that the current log lacks.
    pub fn merge_log(&mut self, name: &str) -> Result<usize> {
        let result = self
            .snapshots
            .load(name)
            .and_then(|records| self.log.merge(records));
        match result {
            Ok(added) => {
                self.sink.notify(Notification::info(
                    "Merge Successful",
                    format!("{added} record(s) from \"{name}\" merged."),
                ));
                if added > 0 {
                    self.sink.log_changed(self.log.records());
                }
                Ok(added)
            }
            Err(e) => Err(self.snapshot_read_failure(e, name)),
        }
    }

    /// Imports a roster from a `.csv` file.
    pub fn import_roster_file(&mut self, path: &Path) -> Result<usize> {
        if path.as_os_str().is_empty() {
            let e = ValidationError::Empty { field: "file" }.into();
            return Err(self.fail(e, "Please select a file first."));
        }
        let is_csv = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            let e = Error::InvalidFileType {
                path: path.to_path_buf(),
            };
            return Err(self.fail(e, "Please upload a .csv file."));
        }

        match std::fs::read_to_string(path) {
            Ok(text) => self.import_roster_text(&text),
            Err(source) => {
                let e = Error::Read {
                    path: path.to_path_buf(),
                    source,
                };
                Err(self.fail(e, "Could not read the selected file."))
            }
        }
    }

    /// Imports a roster from CSV text.
    ///
    /// Text with no names leaves the roster unchanged and reports it
    /// informationally; it is not an error.
    pub fn import_roster_text(&mut self, text: &str) -> Result<usize> {
        match self.roster.import_csv(text) {
            Ok(0) => {
                self.sink.notify(Notification::info(
                    "Empty File or No Names",
                    "The CSV file is empty or does not contain any student names in the first column.",
                ));
                Ok(0)
            }
            Ok(count) => {
                self.sink.notify(Notification::info(
                    "Import Successful",
                    format!("{count} student(s) imported successfully."),
                ));
                Ok(count)
            }
            Err(e) => Err(self.fail_with_message(e)),
        }
    }

    pub fn clear_roster(&mut self) -> Result<()> {
        match self.roster.clear() {
            Ok(()) => {
                self.sink
                    .notify(Notification::info("Roster Cleared", "Student list cleared."));
                Ok(())
            }
            Err(e) => Err(self.fail_with_message(e)),
        }
    }

    /// Renders the current log as CSV.
    pub fn export_csv(&mut self) -> Result<String> {
        match render_log(self.log.records(), self.log.normalizer()) {
            Ok(csv) => {
                self.sink.notify(Notification::info(
                    "Export Successful",
                    format!("{} record(s) exported.", self.log.records().len()),
                ));
                Ok(csv)
            }
            Err(e) => Err(self.fail_with_message(e.into())),
        }
    }

    /// Renders the current log as CSV and writes it to `path`.
    ///
    /// Success is reported only after the file is written. Returns the number
    /// of records exported.
    pub fn export_csv_to(&mut self, path: &Path) -> Result<usize> {
        let csv = match render_log(self.log.records(), self.log.normalizer()) {
            Ok(csv) => csv,
            Err(e) => return Err(self.fail_with_message(e.into())),
        };
        if let Err(source) = std::fs::write(path, csv) {
            let e = Error::Write {
                path: path.to_path_buf(),
                source,
            };
            return Err(self.fail(e, "Could not write the export file."));
        }

        let count = self.log.records().len();
        tracing::debug!(path = %path.display(), count, "wrote export");
        self.sink.notify(Notification::info(
            "Export Successful",
            format!("{count} record(s) exported."),
        ));
        Ok(count)
    }

    fn snapshot_read_failure(&mut self, e: Error, name: &str) -> Error {
        match e {
            Error::Validation(_) => self.fail(e, "Please select a log to load."),
            Error::SnapshotNotFound { .. } => {
                self.fail(e, format!("Could not load the selected log \"{name}\"."))
            }
            e => self.fail_with_message(e),
        }
    }

    fn fail_with_message(&mut self, e: Error) -> Error {
        let description = e.to_string();
        self.fail(e, description)
    }

    /// Reports `e` as a destructive notification and hands it back.
    fn fail(&mut self, e: Error, description: impl Into<String>) -> Error {
        tracing::debug!(error = %e, "operation failed");
        self.sink
            .notify(Notification::destructive(failure_title(&e), description));
        e
    }
}

fn failure_title(e: &Error) -> &'static str {
    match e {
        Error::InvalidFileType { .. } => "Invalid File Type",
        Error::Read { .. } => "File Read Error",
        Error::Write { .. } => "File Write Error",
        e => match e.kind() {
            ErrorKind::Validation | ErrorKind::NotFound => "Error",
            ErrorKind::Parse => "Parse Error",
            ErrorKind::Io => "Storage Error",
        },
    }
}

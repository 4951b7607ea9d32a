//! The activity log engine.
//!
//! Owns the ordered list of [`ActivityRecord`]s (newest first) and keeps the
//! persisted copy under [`ACTIVITY_LOG_KEY`] in step with every mutation.
//!
//! # Thread Safety
//!
//! Mutations take `&mut self`. To share one log between threads, wrap it in a
//! `Mutex` so check-out, check-in, load, merge and clear are serialized.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::record::{ActivityRecord, RawRecord, decode_records, encode_records};
use crate::store::{ACTIVITY_LOG_KEY, KeyValueStore};
use crate::time::Normalizer;
use crate::types::ValidationError;

/// Whether the current log holds any records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogState {
    Empty,
    Active,
}

/// The current activity log over a persistence backend.
#[derive(Debug)]
pub struct ActivityLog<S> {
    store: S,
    normalizer: Normalizer,
    records: Vec<ActivityRecord>,
}

impl<S: KeyValueStore> ActivityLog<S> {
    /// Opens the log stored in `store`, normalizing against the local clock.
    pub fn open(store: S) -> Result<Self> {
        Self::open_with(store, Normalizer::local())
    }

    /// Opens the log stored in `store`.
    ///
    /// Malformed stored JSON is treated as an empty log and left in place
    /// until the next mutation overwrites it. If loading backfilled ids or
    /// rewrote legacy timestamps, the normalized log is persisted once.
    pub fn open_with(store: S, normalizer: Normalizer) -> Result<Self> {
        let raw = match store.get(ACTIVITY_LOG_KEY)? {
            Some(json) => decode_records(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored activity log is malformed, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut log = Self {
            store,
            normalizer,
            records: Vec::new(),
        };
        if log.replace_records(raw) {
            tracing::debug!("persisting normalized legacy records");
            log.persist()?;
        }
        Ok(log)
    }

    /// Records in stored order, newest first.
    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> LogState {
        if self.records.is_empty() {
            LogState::Empty
        } else {
            LogState::Active
        }
    }

    /// True if any record for `subject` has no check-in.
    pub fn is_open(&self, subject: &str) -> bool {
        self.records
            .iter()
            .any(|record| record.subject == subject && record.is_open())
    }

    /// Open records in stored order.
    pub fn open_records(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.records.iter().filter(|record| record.is_open())
    }

    /// Checks `subject` out to `destination` at `now`.
    ///
    /// A subject that is already out may be checked out again; refusing that
    /// is up to the caller via [`Self::is_open`].
    pub fn check_out(
        &mut self,
        subject: &str,
        destination: &str,
        now: DateTime<Utc>,
    ) -> Result<&ActivityRecord> {
        if subject.trim().is_empty() {
            return Err(ValidationError::Empty { field: "subject" }.into());
        }

        let record = ActivityRecord::check_out(subject, destination, now);
        tracing::debug!(id = %record.id, subject, destination, "check-out");
        self.records.insert(0, record);
        self.persist()?;
        Ok(&self.records[0])
    }

    /// Checks `subject` in at `now`.
    ///
    /// Completes the first open record for the subject in stored order, i.e.
    /// the most recently created one. Older open records stay open. An empty
    /// subject has no open record and fails the same way.
    pub fn check_in(&mut self, subject: &str, now: DateTime<Utc>) -> Result<&ActivityRecord> {
        let found = if subject.trim().is_empty() {
            None
        } else {
            self.records
                .iter()
                .position(|record| record.subject == subject && record.is_open())
        };
        let Some(index) = found else {
            return Err(Error::NoOpenRecord {
                subject: subject.to_string(),
            });
        };

        let normalizer = self.normalizer;
        let record = &mut self.records[index];
        record.close(now, &normalizer);
        tracing::debug!(
            id = %record.id,
            subject,
            duration_minutes = ?record.duration_minutes,
            "check-in"
        );
        self.persist()?;
        Ok(&self.records[index])
    }

    /// Replaces the log with `records` after normalizing them.
    pub fn load(&mut self, records: Vec<RawRecord>) -> Result<()> {
        self.replace_records(records);
        tracing::debug!(count = self.records.len(), "loaded activity log");
        self.persist()
    }

    /// Adds records whose ids are not already in the log.
    ///
    /// Incoming records without a stored id are matched on subject,
    /// destination and check-out time instead, so merging the same legacy
    /// snapshot twice adds nothing the second time. Incoming records go after
    /// the existing ones, keeping their relative order. Existing records, open
    /// or closed, are left untouched. Returns the number of records added.
    pub fn merge(&mut self, records: Vec<RawRecord>) -> Result<usize> {
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut seen_events: HashSet<(String, String, String)> = HashSet::new();
        for record in &self.records {
            seen_ids.insert(record.id.to_string());
            seen_events.insert(event_key(record));
        }

        let mut added = 0;
        for raw in records {
            let had_id = raw.id.as_deref().is_some_and(|id| !id.trim().is_empty());
            let record = raw.normalize(&self.normalizer).record;
            let is_new = if had_id {
                !seen_ids.contains(record.id.as_str())
            } else {
                !seen_events.contains(&event_key(&record))
            };
            if is_new {
                seen_ids.insert(record.id.to_string());
                seen_events.insert(event_key(&record));
                self.records.push(record);
                added += 1;
            }
        }

        tracing::debug!(added, total = self.records.len(), "merged activity log");
        if added > 0 {
            self.persist()?;
        }
        Ok(added)
    }

    /// Empties the log and removes its persisted form.
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.store.remove(ACTIVITY_LOG_KEY)?;
        tracing::debug!("cleared activity log");
        Ok(())
    }

    /// Normalizes and installs `raw`, returning whether any record changed.
    fn replace_records(&mut self, raw: Vec<RawRecord>) -> bool {
        let mut changed = false;
        self.records = raw
            .into_iter()
            .map(|record| {
                let normalized = record.normalize(&self.normalizer);
                changed |= normalized.changed;
                normalized.record
            })
            .collect();
        changed
    }

    fn persist(&self) -> Result<()> {
        let json = encode_records(&self.records)?;
        self.store.set(ACTIVITY_LOG_KEY, &json)?;
        Ok(())
    }
}

/// Identity of a record that was stored without an id.
fn event_key(record: &ActivityRecord) -> (String, String, String) {
    (
        record.subject.clone(),
        record.destination.clone(),
        record.check_out_instant.to_string(),
    )
}

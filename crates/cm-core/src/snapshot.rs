//! Named snapshots of the activity log.
//!
//! Each snapshot lives under its own `activityLog_<name>` key. The catalog of
//! names is scanned from the backend once at open and then updated by
//! [`SnapshotStore::save`]; it does not notice snapshots written elsewhere.

use crate::error::{Error, Result};
use crate::record::{ActivityRecord, RawRecord, decode_records, encode_records};
use crate::store::{KeyValueStore, SNAPSHOT_PREFIX};
use crate::types::SnapshotName;

#[derive(Debug)]
pub struct SnapshotStore<S> {
    store: S,
    names: Vec<String>,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    /// Opens the store and scans existing snapshot names.
    pub fn open(store: S) -> Result<Self> {
        let names = store
            .keys_with_prefix(SNAPSHOT_PREFIX)?
            .into_iter()
            .filter_map(|key| key.strip_prefix(SNAPSHOT_PREFIX).map(str::to_string))
            .filter(|name| !name.trim().is_empty())
            .collect();
        Ok(Self { store, names })
    }

    /// Known snapshot names.
    pub fn list(&self) -> &[String] {
        &self.names
    }

    /// Writes `records` under `name`, overwriting any snapshot of that name.
    pub fn save(&mut self, name: &str, records: &[ActivityRecord]) -> Result<SnapshotName> {
        let name = SnapshotName::new(name)?;
        let json = encode_records(records)?;
        self.store.set(&key_for(&name), &json)?;
        if !self.names.iter().any(|known| known == name.as_str()) {
            self.names.push(name.to_string());
        }
        tracing::debug!(name = %name, count = records.len(), "saved snapshot");
        Ok(name)
    }

    /// Reads the snapshot saved under `name`.
    ///
    /// The records are returned unnormalized; pass them to
    /// [`ActivityLog::load`](crate::ActivityLog::load) or
    /// [`ActivityLog::merge`](crate::ActivityLog::merge). A snapshot whose
    /// JSON is malformed reads as empty.
    pub fn load(&self, name: &str) -> Result<Vec<RawRecord>> {
        let name = SnapshotName::new(name)?;
        let Some(json) = self.store.get(&key_for(&name))? else {
            return Err(Error::SnapshotNotFound {
                name: name.to_string(),
            });
        };
        Ok(decode_records(&json).unwrap_or_else(|e| {
            tracing::warn!(name = %name, error = %e, "snapshot is malformed, reading as empty");
            Vec::new()
        }))
    }
}

fn key_for(name: &SnapshotName) -> String {
    format!("{SNAPSHOT_PREFIX}{name}")
}

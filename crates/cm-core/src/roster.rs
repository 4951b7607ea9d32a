//! The roster of trackable names.

use crate::codec::parse_roster;
use crate::error::Result;
use crate::store::{KeyValueStore, ROSTER_KEY};

/// Names offered when no roster has been imported yet.
pub const DEFAULT_ROSTER: [&str; 12] = [
    "Alice", "Bob", "Charlie", "David", "Eve", "Fred", "Ginny", "Harriet", "Ileana", "Joseph",
    "Kevin", "Laura",
];

#[derive(Debug)]
pub struct Roster<S> {
    store: S,
    names: Vec<String>,
}

impl<S: KeyValueStore> Roster<S> {
    /// Opens the stored roster, falling back to `defaults` when none is
    /// stored or the stored value is malformed. Defaults are not persisted.
    pub fn open(store: S, defaults: &[String]) -> Result<Self> {
        let names = match store.get(ROSTER_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored roster is malformed, using defaults");
                defaults.to_vec()
            }),
            None => defaults.to_vec(),
        };
        Ok(Self { store, names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }

    /// Replaces the roster with the names in `text`.
    ///
    /// Text without any names leaves the roster unchanged. Returns the number
    /// of names imported.
    pub fn import_csv(&mut self, text: &str) -> Result<usize> {
        let names = parse_roster(text);
        if names.is_empty() {
            return Ok(0);
        }
        let count = names.len();
        self.store.set(ROSTER_KEY, &serde_json::to_string(&names)?)?;
        self.names = names;
        tracing::debug!(count, "imported roster");
        Ok(count)
    }

    /// Empties the roster and removes its stored form.
    pub fn clear(&mut self) -> Result<()> {
        self.names.clear();
        self.store.remove(ROSTER_KEY)?;
        Ok(())
    }
}

/// [`DEFAULT_ROSTER`] as owned strings.
pub fn default_roster() -> Vec<String> {
    DEFAULT_ROSTER.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::MemoryStore;

    #[test]
    fn missing_roster_uses_defaults_without_persisting() {
        let store = MemoryStore::new();
        let roster = Roster::open(&store, &default_roster()).unwrap();
        assert_eq!(roster.names().len(), 12);
        assert_eq!(roster.names()[0], "Alice");
        assert_eq!(store.get(ROSTER_KEY).unwrap(), None);
    }

    #[test]
    fn malformed_roster_uses_defaults() {
        let store = MemoryStore::with_entries([(ROSTER_KEY, "{")]);
        let roster = Roster::open(&store, &["Zed".to_string()]).unwrap();
        assert_eq!(roster.names(), ["Zed"]);
    }

    #[test]
    fn import_replaces_and_persists() {
        let store = MemoryStore::new();
        let mut roster = Roster::open(&store, &default_roster()).unwrap();
        let count = roster.import_csv("Student\r\nCharlie,12\r\nDana,13\r\n").unwrap();
        assert_eq!(count, 2);
        assert!(roster.contains("Dana"));
        assert!(!roster.contains("Alice"));

        let reopened = Roster::open(&store, &default_roster()).unwrap();
        assert_eq!(reopened.names(), ["Charlie", "Dana"]);
    }

    #[test]
    fn import_without_names_keeps_roster() {
        let store = MemoryStore::new();
        let mut roster = Roster::open(&store, &["Alice".to_string()]).unwrap();
        assert_eq!(roster.import_csv("student\n\n").unwrap(), 0);
        assert_eq!(roster.names(), ["Alice"]);
        assert_eq!(store.get(ROSTER_KEY).unwrap(), None);
    }

    #[test]
    fn clear_removes_stored_roster() {
        let store = MemoryStore::new();
        let mut roster = Roster::open(&store, &[]).unwrap();
        roster.import_csv("Alice\nBob").unwrap();
        roster.clear().unwrap();
        assert!(roster.names().is_empty());
        assert_eq!(store.get(ROSTER_KEY).unwrap(), None);
    }
}

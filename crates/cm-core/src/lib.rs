//! Core domain logic for classroom check-out tracking.
//!
//! This crate contains:
//! - Timestamp normalization for current and legacy time strings
//! - The activity log engine (check-out, check-in, load, merge, clear)
//! - Named log snapshots and the roster, over a key-value persistence surface
//! - CSV roster import and log export
//! - [`Tracker`], which reports every operation to a notification sink

pub mod codec;
mod error;
pub mod log;
pub mod notify;
pub mod record;
pub mod roster;
pub mod snapshot;
pub mod store;
pub mod time;
pub mod tracker;
pub mod types;

pub use codec::{parse_roster, render_log};
pub use error::{Error, ErrorKind, Result};
pub use log::{ActivityLog, LogState};
pub use notify::{Notification, NotificationSink, Severity};
pub use record::{ActivityRecord, RawRecord, Timestamp};
pub use roster::{DEFAULT_ROSTER, Roster, default_roster};
pub use snapshot::SnapshotStore;
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use time::{Normalizer, normalize};
pub use tracker::Tracker;
pub use types::{RecordId, SnapshotName, ValidationError};

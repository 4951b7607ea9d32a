//! Activity records and the legacy-tolerant load path.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::time::{Normalizer, duration_minutes, format_instant};
use crate::types::RecordId;

/// A stored check-out or check-in time.
///
/// Values that could not be normalized are kept verbatim so nothing is lost;
/// they display as-is and are excluded from duration math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Instant(DateTime<Utc>),
    Raw(String),
}

impl Timestamp {
    /// Normalizes `raw`, falling back to the original string.
    pub fn parse(raw: &str, normalizer: &Normalizer) -> Self {
        normalizer
            .normalize(raw)
            .map_or_else(|| Self::Raw(raw.to_string()), Self::Instant)
    }

    /// Returns the instant, re-normalizing a raw value if possible.
    pub fn resolve(&self, normalizer: &Normalizer) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(instant) => Some(*instant),
            Self::Raw(raw) => normalizer.normalize(raw),
        }
    }

    /// Time-of-day text for display.
    pub fn display(&self, normalizer: &Normalizer) -> String {
        match self {
            Self::Instant(instant) => normalizer.display_time(*instant),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(instant) => f.write_str(&format_instant(*instant)),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One check-out, optionally closed by a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: RecordId,
    pub subject: String,
    pub destination: String,
    pub check_out_instant: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_instant: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

impl ActivityRecord {
    /// Creates an open record checked out at `now`.
    pub fn check_out(subject: &str, destination: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::generate(),
            subject: subject.to_string(),
            destination: destination.to_string(),
            check_out_instant: Timestamp::Instant(now),
            check_in_instant: None,
            duration_minutes: None,
        }
    }

    /// True while the record has no check-in.
    pub const fn is_open(&self) -> bool {
        self.check_in_instant.is_none()
    }

    /// Closes the record at `now` and computes its duration.
    ///
    /// The duration stays absent when the check-out time cannot be resolved.
    pub fn close(&mut self, now: DateTime<Utc>, normalizer: &Normalizer) {
        self.duration_minutes = self
            .check_out_instant
            .resolve(normalizer)
            .map(|check_out| duration_minutes(check_out, now));
        self.check_in_instant = Some(Timestamp::Instant(now));
    }

    /// The time shown for this record: check-in if present, else check-out.
    pub fn display_time(&self, normalizer: &Normalizer) -> String {
        self.check_in_instant
            .as_ref()
            .unwrap_or(&self.check_out_instant)
            .display(normalizer)
    }
}

/// A duration as found in stored JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Minutes(i64),
    Fractional(f64),
    /// Legacy text such as `"5 minutes"`.
    Text(String),
}

impl RawDuration {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "stored minute counts are far inside i64 range"
    )]
    fn minutes(&self) -> Option<i64> {
        match self {
            Self::Minutes(minutes) => Some(*minutes),
            Self::Fractional(minutes) if minutes.is_finite() => {
                Some((minutes + 0.5).floor() as i64)
            }
            Self::Fractional(_) => None,
            Self::Text(text) => text.split_whitespace().next()?.parse().ok(),
        }
    }
}

/// A record exactly as read from storage, before normalization.
///
/// Accepts both the current field names and the legacy ones (`student`,
/// `location`, `checkOutTime`, `checkInTime`, `duration`). Numeric ids are
/// kept as their decimal text; ids of any other shape count as missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, alias = "student")]
    pub subject: String,
    #[serde(default, alias = "location")]
    pub destination: String,
    #[serde(default, alias = "checkOutTime")]
    pub check_out_instant: Option<String>,
    #[serde(default, alias = "checkInTime")]
    pub check_in_instant: Option<String>,
    #[serde(default, alias = "duration")]
    pub duration_minutes: Option<RawDuration>,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(id)) => Some(id),
        Some(serde_json::Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

/// Result of normalizing one [`RawRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub record: ActivityRecord,
    /// True if the stored form differs from what will be written back.
    pub changed: bool,
}

impl RawRecord {
    /// Converts a stored record into its canonical form.
    ///
    /// Missing ids are backfilled, time strings are normalized (unparseable
    /// ones are kept raw), and the duration is made consistent with the
    /// check-in: dropped on open records, computed when missing on closed ones.
    pub fn normalize(self, normalizer: &Normalizer) -> Normalized {
        let mut changed = false;

        let id = match self.id.map(RecordId::new) {
            Some(Ok(id)) => id,
            _ => {
                changed = true;
                RecordId::generate()
            }
        };

        let raw_out = self.check_out_instant.unwrap_or_default();
        let check_out_instant = Timestamp::parse(&raw_out, normalizer);
        changed |= check_out_instant.to_string() != raw_out;

        let check_in_instant = match self.check_in_instant {
            Some(raw_in) if !raw_in.trim().is_empty() => {
                let parsed = Timestamp::parse(&raw_in, normalizer);
                changed |= parsed.to_string() != raw_in;
                Some(parsed)
            }
            Some(_) => {
                changed = true;
                None
            }
            None => None,
        };

        let stored_minutes = self.duration_minutes.as_ref().and_then(RawDuration::minutes);
        let duration_minutes = match &check_in_instant {
            None => None,
            Some(check_in) => stored_minutes.or_else(|| {
                let out = check_out_instant.resolve(normalizer)?;
                let inn = check_in.resolve(normalizer)?;
                Some(duration_minutes(out, inn))
            }),
        };
        changed |= match (&self.duration_minutes, duration_minutes) {
            (None, None) => false,
            (Some(RawDuration::Minutes(stored)), Some(minutes)) => *stored != minutes,
            _ => true,
        };

        Normalized {
            record: ActivityRecord {
                id,
                subject: self.subject,
                destination: self.destination,
                check_out_instant,
                check_in_instant,
                duration_minutes,
            },
            changed,
        }
    }
}

/// Decodes a stored JSON array of records.
///
/// Elements that do not look like records are skipped with a warning; only a
/// document that is not an array at all is an error.
pub fn decode_records(json: &str) -> Result<Vec<RawRecord>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed activity record");
            }
        }
    }
    Ok(records)
}

/// Encodes records as the stored JSON array.
pub fn encode_records(records: &[ActivityRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{FixedOffset, NaiveDate};

    fn normalizer() -> Normalizer {
        Normalizer::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn serializes_camel_case_and_skips_open_fields() {
        let record = ActivityRecord {
            id: RecordId::new("rec-1").unwrap(),
            subject: "Alice".into(),
            destination: "Library".into(),
            check_out_instant: at("2025-03-10T10:00:00Z").into(),
            check_in_instant: None,
            duration_minutes: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"id":"rec-1","subject":"Alice","destination":"Library","checkOutInstant":"2025-03-10T10:00:00.000Z"}"#
        );
    }

    #[test]
    fn close_computes_rounded_duration() {
        let n = normalizer();
        let mut record = ActivityRecord::check_out("Alice", "Gym", at("2025-03-10T10:00:00Z"));
        record.close(at("2025-03-10T10:05:30Z"), &n);
        assert!(!record.is_open());
        assert_eq!(record.duration_minutes, Some(6));
    }

    #[test]
    fn close_with_unresolvable_check_out_leaves_duration_absent() {
        let n = normalizer();
        let mut record = ActivityRecord::check_out("Alice", "Gym", at("2025-03-10T10:00:00Z"));
        record.check_out_instant = Timestamp::Raw("after lunch".into());
        record.close(at("2025-03-10T10:05:30Z"), &n);
        assert!(!record.is_open());
        assert_eq!(record.duration_minutes, None);
        assert_eq!(record.display_time(&n), "10:05:30 AM");
    }

    #[test]
    fn legacy_record_is_backfilled_and_normalized() {
        let json = r#"[{"student":"Bob","location":"Office","checkOutTime":"10:00:00 AM","checkInTime":"10:12:00 AM","duration":"12 minutes"}]"#;
        let raw = decode_records(json).unwrap();
        let normalized = raw.into_iter().next().unwrap().normalize(&normalizer());

        assert!(normalized.changed);
        let record = normalized.record;
        assert!(!record.id.as_str().is_empty());
        assert_eq!(record.subject, "Bob");
        assert_eq!(record.destination, "Office");
        assert_eq!(
            record.check_out_instant,
            Timestamp::Instant(at("2025-03-10T10:00:00Z"))
        );
        assert_eq!(
            record.check_in_instant,
            Some(Timestamp::Instant(at("2025-03-10T10:12:00Z")))
        );
        assert_eq!(record.duration_minutes, Some(12));
    }

    #[test]
    fn unparseable_times_are_kept_raw() {
        let raw = RawRecord {
            id: Some("rec-9".into()),
            subject: "Eve".into(),
            destination: "Other".into(),
            check_out_instant: Some("sometime".into()),
            check_in_instant: Some("later".into()),
            duration_minutes: None,
        };
        let record = raw.normalize(&normalizer()).record;
        assert_eq!(record.id.as_str(), "rec-9");
        assert_eq!(record.check_out_instant, Timestamp::Raw("sometime".into()));
        assert_eq!(record.check_in_instant, Some(Timestamp::Raw("later".into())));
        assert_eq!(record.duration_minutes, None);
    }

    #[test]
    fn canonical_record_is_unchanged() {
        let json = r#"[{"id":"rec-1","subject":"Alice","destination":"Gym","checkOutInstant":"2025-03-10T10:00:00.000Z","checkInInstant":"2025-03-10T10:06:00.000Z","durationMinutes":6}]"#;
        let raw = decode_records(json).unwrap().remove(0);
        let normalized = raw.normalize(&normalizer());
        assert!(!normalized.changed);
        assert_eq!(normalized.record.duration_minutes, Some(6));
    }

    #[test]
    fn open_record_drops_stray_duration_and_empty_check_in() {
        let json = r#"[{"id":"rec-2","student":"Dana","location":"Gym","checkOutTime":"2025-03-10T10:00:00.000Z","checkInTime":"","duration":"3 minutes"}]"#;
        let raw = decode_records(json).unwrap().remove(0);
        let normalized = raw.normalize(&normalizer());
        assert!(normalized.changed);
        assert!(normalized.record.is_open());
        assert_eq!(normalized.record.duration_minutes, None);
    }

    #[test]
    fn missing_duration_is_computed_for_closed_record() {
        let json = r#"[{"id":"rec-3","subject":"Fred","destination":"Library","checkOutInstant":"2025-03-10T10:00:00.000Z","checkInInstant":"2025-03-10T10:20:00.000Z"}]"#;
        let raw = decode_records(json).unwrap().remove(0);
        let normalized = raw.normalize(&normalizer());
        assert!(normalized.changed);
        assert_eq!(normalized.record.duration_minutes, Some(20));
    }

    #[test]
    fn decode_skips_malformed_elements() {
        let json = r#"[{"id":"ok","subject":"A","checkOutInstant":"2025-03-10T10:00:00.000Z"}, 42, "nope"]"#;
        let records = decode_records(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("ok"));
    }

    #[test]
    fn decode_keeps_records_with_numeric_or_odd_ids() {
        let json = r#"[
            {"id":1741600800000,"subject":"Alice","destination":"Gym","checkOutInstant":"2025-03-10T10:00:00.000Z"},
            {"id":{"nested":true},"subject":"Bob","destination":"Office","checkOutInstant":"2025-03-10T10:01:00.000Z"},
            {"id":"b","subject":"Carl","destination":"Library","checkOutInstant":"2025-03-10T10:02:00.000Z"}
        ]"#;
        let records = decode_records(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id.as_deref(), Some("1741600800000"));
        assert_eq!(records[1].id, None);
        assert_eq!(records[2].id.as_deref(), Some("b"));

        let alice = records[0].clone().normalize(&normalizer()).record;
        assert_eq!(alice.id.as_str(), "1741600800000");
        assert!(alice.is_open());
        let bob = records[1].clone().normalize(&normalizer());
        assert!(bob.changed);
        assert!(!bob.record.id.as_str().is_empty());
    }

    #[test]
    fn decode_rejects_non_array_documents() {
        assert!(decode_records("{not json").is_err());
        assert!(decode_records(r#"{"subject":"A"}"#).is_err());
    }
}

//! Timestamp normalization.
//!
//! Records written by older versions of the app stored a wall-clock string
//! such as `10:23:45 AM`; newer records store a full RFC 3339 instant. The
//! [`Normalizer`] accepts both so duration math and display are uniform.

use std::sync::LazyLock;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc,
};
use regex::Regex;

/// `H:MM[:SS] [AM|PM]`, meridiem optional and case-insensitive.
static TIME_OF_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([AP])\.?M\.?)?$").unwrap()
});

/// Naive date-time layouts, read in the normalizer's local offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y, %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const MS_PER_MINUTE: i64 = 60_000;

/// Parses heterogeneous time strings into canonical UTC instants.
///
/// Time-only inputs are anchored to `today` in `offset`. Both are captured
/// once, so a normalizer built at startup keeps resolving legacy clock strings
/// against the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    today: NaiveDate,
    offset: FixedOffset,
}

impl Normalizer {
    /// Creates a normalizer anchored to the given date and local offset.
    pub const fn new(today: NaiveDate, offset: FixedOffset) -> Self {
        Self { today, offset }
    }

    /// Creates a normalizer from the system clock and local time zone.
    pub fn local() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            offset: now.offset().fix(),
        }
    }

    /// The date used for time-only inputs.
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// The offset used for naive inputs and display.
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parses `raw` into an instant, or returns `None` if it is not a
    /// recognized date-time or time-of-day.
    pub fn normalize(&self, raw: &str) -> Option<DateTime<Utc>> {
        let cleaned = raw.trim().replace(['\u{202f}', '\u{a0}'], " ");
        if cleaned.is_empty() {
            return None;
        }
        self.parse_date_time(&cleaned)
            .or_else(|| self.parse_time_of_day(&cleaned))
    }

    /// Renders an instant as a locale time of day, e.g. `10:05:30 AM`.
    pub fn display_time(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format("%-I:%M:%S %p")
            .to_string()
    }

    fn parse_date_time(&self, s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .and_then(|naive| self.localize(naive))
    }

    fn parse_time_of_day(&self, s: &str) -> Option<DateTime<Utc>> {
        let caps = TIME_OF_DAY_RE.captures(s)?;
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let second: u32 = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };

        match caps.get(4).map(|m| m.as_str().to_ascii_uppercase()) {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                if meridiem == "A" && hour == 12 {
                    hour = 0;
                } else if meridiem == "P" && hour < 12 {
                    hour += 12;
                }
            }
            None if hour > 23 => return None,
            None => {}
        }

        let naive = self.today.and_hms_opt(hour, minute, second)?;
        self.localize(naive)
    }

    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::local()
    }
}

/// Parses `raw` with a normalizer anchored to the local clock.
pub fn normalize(raw: &str) -> Option<DateTime<Utc>> {
    Normalizer::local().normalize(raw)
}

/// Formats an instant the way it is persisted: RFC 3339, UTC, milliseconds.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whole minutes between two instants, rounding halves up (5.5 → 6, -5.5 → -5).
pub fn duration_minutes(check_out: DateTime<Utc>, check_in: DateTime<Utc>) -> i64 {
    let ms = (check_in - check_out).num_milliseconds();
    (ms + MS_PER_MINUTE / 2).div_euclid(MS_PER_MINUTE)
}

//! CSV codec: roster import and activity log export.

use crate::record::ActivityRecord;
use crate::time::Normalizer;

/// Header row of the exported log.
pub const EXPORT_HEADER: [&str; 4] = ["Student", "Type", "Location", "Time"];

/// Extracts names from roster CSV text.
///
/// Takes the first comma-separated field of each LF or CRLF line, trims it,
/// and drops blank rows and `student` header rows (any case). Order and
/// duplicates are preserved.
pub fn parse_roster(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split(',').next().unwrap_or_default().trim())
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("student"))
        .map(str::to_string)
        .collect()
}

/// Renders the log as CSV, one row per record in stored order.
///
/// `Type` is `check-in` for closed records and `check-out` for open ones;
/// `Time` is the check-in time if present, else the check-out time.
pub fn render_log(records: &[ActivityRecord], normalizer: &Normalizer) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        let kind = if record.is_open() { "check-out" } else { "check-in" };
        writer.write_record([
            record.subject.as_str(),
            kind,
            record.destination.as_str(),
            record.display_time(normalizer).as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

    use crate::record::Timestamp;
    use crate::types::RecordId;

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
    fn parse_trims_and_skips_header_and_blank_rows() {
        assert_eq!(parse_roster("Student\n Alice \n\nBob  \n"), ["Alice", "Bob"]);
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_roster("").is_empty());
    }

    #[test]
    fn parse_crlf_takes_first_column() {
        assert_eq!(parse_roster("Charlie,12\r\nDana,13\r\n"), ["Charlie", "Dana"]);
        assert_eq!(
            parse_roster("Student,Age\r\nCharlie,12\r\nDana,13\r\n"),
            ["Charlie", "Dana"]
        );
    }

    #[test]
    fn parse_header_is_case_insensitive_and_duplicates_are_kept() {
        assert_eq!(
            parse_roster("STUDENT\nAlice\nAlice\nstudent"),
            ["Alice", "Alice"]
        );
    }

    #[test]
    fn render_uses_check_in_time_for_closed_records() {
        let n = normalizer();
        let mut closed = ActivityRecord::check_out("Alice", "Library", at("2025-03-10T10:00:00Z"));
        closed.close(at("2025-03-10T10:05:30Z"), &n);
        let open = ActivityRecord::check_out("Bob", "Gym", at("2025-03-10T13:15:00Z"));

        let csv = render_log(&[open, closed], &n).unwrap();
        assert_eq!(
            csv,
            "Student,Type,Location,Time\n\
             Bob,check-out,Gym,1:15:00 PM\n\
             Alice,check-in,Library,10:05:30 AM\n"
        );
    }

    #[test]
    fn render_keeps_raw_times_and_quotes_commas() {
        let record = ActivityRecord {
            id: RecordId::new("rec-1").unwrap(),
            subject: "Lee, Ann".into(),
            destination: "Office".into(),
            check_out_instant: Timestamp::Raw("after lunch".into()),
            check_in_instant: None,
            duration_minutes: None,
        };
        let csv = render_log(&[record], &normalizer()).unwrap();
        assert_eq!(
            csv,
            "Student,Type,Location,Time\n\"Lee, Ann\",check-out,Office,after lunch\n"
        );
    }

    #[test]
    fn render_empty_log_is_header_only() {
        assert_eq!(
            render_log(&[], &normalizer()).unwrap(),
            "Student,Type,Location,Time\n"
        );
    }
}

//! Activity log display, clearing and CSV export.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cm_core::{ActivityRecord, KeyValueStore, Normalizer, NotificationSink, Tracker};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Write the CSV to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Runs `checkmate log`.
pub fn show<W, S, N>(writer: &mut W, tracker: &Tracker<S, N>, args: &LogArgs) -> Result<()>
where
    W: Write,
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    if args.json {
        let json = serde_json::to_string_pretty(tracker.records())?;
        writeln!(writer, "{json}")?;
    } else {
        write_table(writer, tracker.records(), tracker.normalizer())?;
    }
    Ok(())
}

fn write_table<W: Write>(
    writer: &mut W,
    records: &[ActivityRecord],
    normalizer: &Normalizer,
) -> Result<()> {
    if records.is_empty() {
        writeln!(writer, "The activity log is empty.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<20}  {:<14}  {:<12}  {:<12}  {}",
        "STUDENT", "DESTINATION", "OUT", "IN", "MINUTES"
    )?;
    for record in records {
        let check_in = record
            .check_in_instant
            .as_ref()
            .map_or_else(|| "-".to_string(), |ts| ts.display(normalizer));
        let minutes = record
            .duration_minutes
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        writeln!(
            writer,
            "{:<20}  {:<14}  {:<12}  {:<12}  {}",
            record.subject,
            record.destination,
            record.check_out_instant.display(normalizer),
            check_in,
            minutes
        )?;
    }
    Ok(())
}

/// Runs `checkmate clear`.
pub fn clear<S, N>(tracker: &mut Tracker<S, N>) -> Result<()>
where
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    tracker.clear_log()?;
    Ok(())
}

/// Runs `checkmate export`.
pub fn export<W, S, N>(writer: &mut W, tracker: &mut Tracker<S, N>, args: &ExportArgs) -> Result<()>
where
    W: Write,
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    match &args.output {
        Some(path) => {
            tracker.export_csv_to(path)?;
        }
        None => {
            let csv = tracker.export_csv()?;
            writer.write_all(csv.as_bytes())?;
        }
    }
    Ok(())
}

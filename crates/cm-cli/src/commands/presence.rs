//! Check-out, check-in and status commands.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::Args;
use cm_core::time::duration_minutes;
use cm_core::{KeyValueStore, NotificationSink, Tracker};

#[derive(Debug, Args)]
pub struct OutArgs {
    /// Student to check out.
    pub student: String,
    /// Where the student is going.
    pub destination: String,
    /// Check the student out even if they are already out.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct InArgs {
    /// Student to check in.
    pub student: String,
}

/// Runs `checkmate out`.
pub fn check_out<S, N>(tracker: &mut Tracker<S, N>, args: &OutArgs, now: DateTime<Utc>) -> Result<()>
where
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    let student = args.student.trim();
    if !args.force && tracker.is_open(student) {
        bail!("{student} is already checked out; check them in first or pass --force");
    }
    if !student.is_empty() && !tracker.on_roster(student) {
        tracing::warn!(student, "student is not on the roster");
    }

    tracker.check_out(student, args.destination.trim(), now)?;
    Ok(())
}

/// Runs `checkmate in`.
pub fn check_in<S, N>(tracker: &mut Tracker<S, N>, args: &InArgs, now: DateTime<Utc>) -> Result<()>
where
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    tracker.check_in(args.student.trim(), now)?;
    Ok(())
}

/// Runs `checkmate status`: one row per student who is out, newest first.
pub fn status<W, S, N>(writer: &mut W, tracker: &Tracker<S, N>, now: DateTime<Utc>) -> Result<()>
where
    W: Write,
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    let normalizer = tracker.normalizer();
    let mut open = tracker.log().open_records().peekable();
    if open.peek().is_none() {
        writeln!(writer, "No students are checked out.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<20}  {:<14}  {:<12}  {}",
        "STUDENT", "DESTINATION", "OUT", "MINUTES"
    )?;
    for record in open {
        let minutes = record
            .check_out_instant
            .resolve(normalizer)
            .map_or_else(|| "-".to_string(), |out| duration_minutes(out, now).to_string());
        writeln!(
            writer,
            "{:<20}  {:<14}  {:<12}  {}",
            record.subject,
            record.destination,
            record.check_out_instant.display(normalizer),
            minutes
        )?;
    }
    Ok(())
}

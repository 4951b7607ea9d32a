//! Saved log commands.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use cm_core::{KeyValueStore, NotificationSink, Tracker};

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Name to save the current log under.
    pub name: String,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Name of the saved log.
    pub name: String,
    /// Add records missing from the current log instead of replacing it.
    #[arg(long)]
    pub merge: bool,
}

/// Runs `checkmate save`.
pub fn save<S, N>(tracker: &mut Tracker<S, N>, args: &SaveArgs) -> Result<()>
where
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    tracker.save_log(&args.name)?;
    Ok(())
}

/// Runs `checkmate load`.
pub fn load<S, N>(tracker: &mut Tracker<S, N>, args: &LoadArgs) -> Result<()>
where
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    if args.merge {
        let added = tracker.merge_log(&args.name)?;
        tracing::debug!(added, name = %args.name, "merged saved log");
    } else {
        tracker.load_log(&args.name)?;
    }
    Ok(())
}

/// Runs `checkmate saved`.
pub fn list<W, S, N>(writer: &mut W, tracker: &Tracker<S, N>) -> Result<()>
where
    W: Write,
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    let names = tracker.saved_logs();
    if names.is_empty() {
        writeln!(writer, "No saved logs.")?;
    }
    for name in names {
        writeln!(writer, "{name}")?;
    }
    Ok(())
}

//! Roster commands.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use cm_core::{KeyValueStore, NotificationSink, Tracker};

#[derive(Debug, Subcommand)]
pub enum RosterAction {
    /// List students on the roster.
    List,
    /// Replace the roster with the first column of a CSV file.
    Import {
        /// CSV file with a header row.
        file: PathBuf,
    },
    /// Remove the imported roster.
    Clear,
}

/// Runs `checkmate roster`.
pub fn run<W, S, N>(writer: &mut W, tracker: &mut Tracker<S, N>, action: &RosterAction) -> Result<()>
where
    W: Write,
    S: KeyValueStore + Clone,
    N: NotificationSink,
{
    match action {
        RosterAction::List => {
            let names = tracker.roster();
            if names.is_empty() {
                writeln!(writer, "The roster is empty.")?;
            }
            for name in names {
                writeln!(writer, "{name}")?;
            }
        }
        RosterAction::Import { file } => {
            let count = tracker.import_roster_file(file)?;
            tracing::debug!(count, file = %file.display(), "imported roster");
        }
        RosterAction::Clear => tracker.clear_roster()?,
    }
    Ok(())
}

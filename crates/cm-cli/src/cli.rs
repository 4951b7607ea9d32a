//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::log::{ExportArgs, LogArgs};
use crate::commands::presence::{InArgs, OutArgs};
use crate::commands::roster::RosterAction;
use crate::commands::snapshot::{LoadArgs, SaveArgs};

/// Classroom check-out tracker.
///
/// Records which students are out of the room, where they went and for how
/// long, and keeps named copies of the activity log.
#[derive(Debug, Parser)]
#[command(name = "checkmate", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check a student out to a destination.
    Out(OutArgs),

    /// Check a student back in.
    In(InArgs),

    /// Show students who are currently out.
    Status,

    /// Show the current activity log.
    Log(LogArgs),

    /// Clear the current activity log. Saved logs are kept.
    Clear,

    /// Save the current activity log under a name.
    Save(SaveArgs),

    /// Replace the current log with a saved one, or merge it in.
    Load(LoadArgs),

    /// List saved logs.
    Saved,

    /// Manage the student roster.
    #[command(subcommand)]
    Roster(RosterAction),

    /// List the configured destinations.
    Destinations,

    /// Export the current log as CSV.
    Export(ExportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_out_with_force() {
        let cli = Cli::parse_from(["checkmate", "out", "Alice", "Library", "--force"]);
        let Some(Commands::Out(args)) = cli.command else {
            panic!("expected out command");
        };
        assert_eq!(args.student, "Alice");
        assert_eq!(args.destination, "Library");
        assert!(args.force);
    }

    #[test]
    fn parses_load_merge_and_roster_import() {
        let cli = Cli::parse_from(["checkmate", "load", "period-1", "--merge"]);
        let Some(Commands::Load(args)) = cli.command else {
            panic!("expected load command");
        };
        assert_eq!(args.name, "period-1");
        assert!(args.merge);

        let cli = Cli::parse_from(["checkmate", "-v", "roster", "import", "class.csv"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Some(Commands::Roster(RosterAction::Import { .. }))
        ));
    }
}

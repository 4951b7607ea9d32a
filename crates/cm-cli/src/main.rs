use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cm_core::Tracker;
use cm_db::SqliteStore;
use tracing_subscriber::EnvFilter;

use cm_cli::commands::{destinations, log, presence, roster, snapshot};
use cm_cli::{Cli, Commands, Config, StderrSink};

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(SqliteStore, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store = SqliteStore::open(&config.database_path).context("failed to open database")?;
    Ok((store, config))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let (store, config) = open_store(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    if matches!(command, Commands::Destinations) {
        destinations::run(&mut stdout, &config.destinations)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut tracker = Tracker::open(&store, StderrSink::default(), &config.roster)
        .context("failed to open activity log")?;
    let now = Utc::now();

    let result = match command {
        Commands::Out(args) => presence::check_out(&mut tracker, args, now),
        Commands::In(args) => presence::check_in(&mut tracker, args, now),
        Commands::Status => presence::status(&mut stdout, &tracker, now),
        Commands::Log(args) => log::show(&mut stdout, &tracker, args),
        Commands::Clear => log::clear(&mut tracker),
        Commands::Save(args) => snapshot::save(&mut tracker, args),
        Commands::Load(args) => snapshot::load(&mut tracker, args),
        Commands::Saved => snapshot::list(&mut stdout, &tracker),
        Commands::Roster(action) => roster::run(&mut stdout, &mut tracker, action),
        Commands::Export(args) => log::export(&mut stdout, &mut tracker, args),
        Commands::Destinations => Ok(()),
    };
    stdout.flush()?;

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Already reported through the notification sink.
        Err(e) if tracker.sink().failed() => {
            tracing::debug!(error = %e, "command failed");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}

//! CLI subcommand implementations.

pub mod destinations;
pub mod log;
pub mod presence;
pub mod roster;
pub mod snapshot;

//! Destinations command.

use std::io::Write;

use anyhow::Result;

/// Runs `checkmate destinations`.
pub fn run<W: Write>(writer: &mut W, destinations: &[String]) -> Result<()> {
    for destination in destinations {
        writeln!(writer, "{destination}")?;
    }
    Ok(())
}

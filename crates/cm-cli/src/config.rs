//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Destinations offered when none are configured.
pub const DEFAULT_DESTINATIONS: [&str; 6] =
    ["Library", "Restroom", "Cafeteria", "Gym", "Office", "Other"];

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Roster used until one is imported.
    pub roster: Vec<String>,

    /// Destinations listed by `checkmate destinations`.
    pub destinations: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("roster", &self.roster.len())
            .field("destinations", &self.destinations)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("checkmate.db"),
            roster: cm_core::default_roster(),
            destinations: DEFAULT_DESTINATIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CHECKMATE_*)
        figment = figment.merge(Env::prefixed("CHECKMATE_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for checkmate.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("checkmate"))
}

/// Returns the platform-specific data directory for checkmate.
///
/// On Linux: `~/.local/share/checkmate`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("checkmate"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_data_path_ends_with_checkmate() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "checkmate");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("checkmate.db"));
        assert_eq!(config.roster.len(), 12);
        assert_eq!(config.destinations[0], "Library");
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
database_path = "/tmp/class.db"
destinations = ["Nurse", "Office"]
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/class.db"));
        assert_eq!(config.destinations, vec!["Nurse", "Office"]);
        assert_eq!(config.roster.len(), 12);
    }
}

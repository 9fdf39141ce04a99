//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chore_core::SortKey;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Sort order for `chore list` when `--sort` is not given.
    #[serde(default)]
    pub default_sort: SortKey,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("default_sort", &self.default_sort)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("chore.db"),
            default_sort: SortKey::default(),
        }
    }
}

impl Config {
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

        // Load from environment variables (CHORE_*)
        figment = figment.merge(Env::prefixed("CHORE_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for chore.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("chore"))
}

/// Returns the platform-specific data directory for chore.
///
/// On Linux: `~/.local/share/chore`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("chore"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_chore() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "chore");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("chore.db"));
        assert_eq!(config.default_sort, SortKey::NextDueDate);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"database_path = "/tmp/chores.db""#).unwrap();
        writeln!(file, r#"default_sort = "name""#).unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/chores.db"));
        assert_eq!(config.default_sort, SortKey::Name);
    }

    #[test]
    fn test_config_rejects_unknown_sort_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"default_sort = "size""#).unwrap();
        file.flush().unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }
}

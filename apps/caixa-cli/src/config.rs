//! # Configuration
//!
//! Optional `caixa.toml`, loaded once at startup.
//!
//! ## Load Order (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file: `--config <path>`, else the platform config directory
//!    (e.g. `~/.config/caixa/caixa.toml` on Linux)
//! 3. `--db <path>` on the command line (database path only)
//!
//! ## Example
//! ```toml
//! database_path = "/srv/loja/Historico.db"
//! currency_format = "brazilian"
//! export_with_id = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use caixa_core::CurrencyFormat;
use caixa_db::DEFAULT_DATABASE_FILE;

/// Name of the config file inside the config directory.
pub const CONFIG_FILE: &str = "caixa.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ledger database file. Relative paths resolve against the working
    /// directory.
    /// Default: "Historico.db"
    pub database_path: PathBuf,

    /// How amounts are shown on screen. Interchange files always use the
    /// plain format.
    /// Default: brazilian
    pub currency_format: CurrencyFormat,

    /// Add the ID column to exports.
    /// Default: false
    pub export_with_id: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            currency_format: CurrencyFormat::Brazilian,
            export_with_id: false,
        }
    }
}

impl AppConfig {
    /// Loads the config file.
    ///
    /// An explicit `path` must exist. The default location is optional: when
    /// no file is there the defaults are used.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Self::from_file(&path)
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                other => {
                    debug!(path = ?other, "Config file not found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Reads and parses one file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config from file");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "caixa", "caixa")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Formats an amount for the terminal.
    pub fn format_money(&self, amount: caixa_core::Money) -> String {
        self.currency_format.format(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caixa_core::Money;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database_path, PathBuf::from("Historico.db"));
        assert_eq!(config.currency_format, CurrencyFormat::Brazilian);
        assert!(!config.export_with_id);
        assert_eq!(config.format_money(Money::from_cents(123450)), "R$ 1.234,50");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("currency_format = \"plain\"").unwrap();
        assert_eq!(config.currency_format, CurrencyFormat::Plain);
        assert_eq!(config.database_path, PathBuf::from("Historico.db"));
        assert_eq!(config.format_money(Money::from_cents(123450)), "R$ 1234.50");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig {
            database_path: PathBuf::from("/srv/loja/Historico.db"),
            currency_format: CurrencyFormat::Plain,
            export_with_id: true,
        };

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "database_path = \"loja.db\"\nexport_with_id = true\n").unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("loja.db"));
        assert!(config.export_with_id);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(dir.path().join("nada.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_unknown_currency_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "currency_format = \"euro\"\n").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

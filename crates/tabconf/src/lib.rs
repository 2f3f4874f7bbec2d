//! Configuration loading for abctab.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tabconf::TabConfig;
//!
//! let config = TabConfig::load().expect("Failed to load config");
//! println!("Instrument: {}", config.tablature.instrument);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/abctab/config.toml` (system)
//! 2. `~/.config/abctab/config.toml` (user)
//! 3. `./abctab.toml` (local override, or the `--config` path)
//! 4. Environment variables (`ABCTAB_*`, `RUST_LOG`)
//!
//! Only keys present in a file override what came before.
//!
//! # Example Config
//!
//! ```toml
//! [tablature]
//! instrument = "whistle"
//! whistle_key = "G"
//! auto_whistle_key = false
//! skip_repeated = true
//!
//! [transpose]
//! bar_accidentals = true
//!
//! [logging]
//! level = "abc=debug"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use settings::{LoggingConfig, TablatureConfig, TransposeConfig, INSTRUMENTS, WHISTLE_KEYS};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key} from {origin}: {value}")]
    InvalidValue {
        key: String,
        value: String,
        origin: String,
    },
}

/// Complete abctab configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TabConfig {
    #[serde(default)]
    pub tablature: TablatureConfig,

    #[serde(default)]
    pub transpose: TransposeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TabConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load with `config_path` standing in for `./abctab.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = TabConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::load_from_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources, |name| std::env::var(name).ok())?;

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# abctab configuration\n\n");

        output.push_str("[tablature]\n");
        output.push_str(&format!("instrument = \"{}\"\n", self.tablature.instrument));
        output.push_str(&format!("whistle_key = \"{}\"\n", self.tablature.whistle_key));
        output.push_str(&format!(
            "auto_whistle_key = {}\n",
            self.tablature.auto_whistle_key
        ));
        output.push_str(&format!("skip_repeated = {}\n", self.tablature.skip_repeated));

        output.push_str("\n[transpose]\n");
        output.push_str(&format!(
            "bar_accidentals = {}\n",
            self.transpose.bar_accidentals
        ));

        output.push_str("\n[logging]\n");
        output.push_str(&format!("level = \"{}\"\n", self.logging.level));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TabConfig::default();
        assert_eq!(config.tablature.instrument, "whistle");
        assert!(config.transpose.bar_accidentals);
    }

    #[test]
    fn test_to_toml() {
        let toml = TabConfig::default().to_toml();
        assert!(toml.contains("[tablature]"));
        assert!(toml.contains("whistle_key = \"D\""));
        assert!(toml.contains("[transpose]"));
        assert!(toml.contains("level = \"warn\""));
    }

    #[test]
    fn test_to_toml_parses_back() {
        let mut config = TabConfig::default();
        config.tablature.instrument = "fiddle".to_string();
        config.tablature.skip_repeated = true;
        config.logging.level = "abc=debug".to_string();

        let parsed: TabConfig = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }
}

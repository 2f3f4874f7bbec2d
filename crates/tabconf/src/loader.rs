//! Config file discovery, loading, and environment variable overlay.

use crate::settings::{INSTRUMENTS, WHISTLE_KEYS};
use crate::{ConfigError, TabConfig};
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Only returns files
/// that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// A CLI path replaces the local override and is returned even if it does
/// not exist, so that loading reports it.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/abctab/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("abctab/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("abctab.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file and apply the keys it sets on top of `config`.
pub fn load_from_file(config: &mut TabConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Apply the keys present in a TOML document. Missing keys leave `config`
/// as it was.
pub fn apply_toml(config: &mut TabConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let origin = path.display().to_string();

    if let Some(tab) = table.get("tablature").and_then(|v| v.as_table()) {
        if let Some(v) = tab.get("instrument") {
            config.tablature.instrument = instrument("tablature.instrument", &str_value(v), &origin)?;
        }
        if let Some(v) = tab.get("whistle_key") {
            config.tablature.whistle_key = whistle_key("tablature.whistle_key", &str_value(v), &origin)?;
        }
        if let Some(v) = tab.get("auto_whistle_key") {
            config.tablature.auto_whistle_key = bool_value("tablature.auto_whistle_key", v, &origin)?;
        }
        if let Some(v) = tab.get("skip_repeated") {
            config.tablature.skip_repeated = bool_value("tablature.skip_repeated", v, &origin)?;
        }
    }

    if let Some(transpose) = table.get("transpose").and_then(|v| v.as_table()) {
        if let Some(v) = transpose.get("bar_accidentals") {
            config.transpose.bar_accidentals = bool_value("transpose.bar_accidentals", v, &origin)?;
        }
    }

    if let Some(logging) = table.get("logging").and_then(|v| v.as_table()) {
        if let Some(v) = logging.get("level").and_then(|v| v.as_str()) {
            config.logging.level = v.to_string();
        }
    }

    Ok(())
}

/// Apply environment variable overrides to config.
///
/// `lookup` reads a variable; the binary passes `std::env::var`.
pub fn apply_env_overrides(
    config: &mut TabConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = lookup("ABCTAB_INSTRUMENT") {
        config.tablature.instrument = instrument("ABCTAB_INSTRUMENT", &v, "environment")?;
        sources.env_overrides.push("ABCTAB_INSTRUMENT".to_string());
    }
    if let Some(v) = lookup("ABCTAB_WHISTLE_KEY") {
        config.tablature.whistle_key = whistle_key("ABCTAB_WHISTLE_KEY", &v, "environment")?;
        sources.env_overrides.push("ABCTAB_WHISTLE_KEY".to_string());
    }
    if let Some(v) = lookup("ABCTAB_AUTO_WHISTLE_KEY") {
        config.tablature.auto_whistle_key = env_bool("ABCTAB_AUTO_WHISTLE_KEY", &v)?;
        sources.env_overrides.push("ABCTAB_AUTO_WHISTLE_KEY".to_string());
    }
    if let Some(v) = lookup("ABCTAB_SKIP_REPEATED") {
        config.tablature.skip_repeated = env_bool("ABCTAB_SKIP_REPEATED", &v)?;
        sources.env_overrides.push("ABCTAB_SKIP_REPEATED".to_string());
    }
    if let Some(v) = lookup("ABCTAB_BAR_ACCIDENTALS") {
        config.transpose.bar_accidentals = env_bool("ABCTAB_BAR_ACCIDENTALS", &v)?;
        sources.env_overrides.push("ABCTAB_BAR_ACCIDENTALS".to_string());
    }

    if let Some(v) = lookup("ABCTAB_LOG_LEVEL") {
        config.logging.level = v;
        sources.env_overrides.push("ABCTAB_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.logging.level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    Ok(())
}

fn invalid(key: &str, value: &str, origin: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        origin: origin.to_string(),
    }
}

/// Strings as written, anything else in TOML syntax for error messages
fn str_value(value: &toml::Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

fn instrument(key: &str, value: &str, origin: &str) -> Result<String, ConfigError> {
    let lower = value.trim().to_ascii_lowercase();
    if INSTRUMENTS.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        Err(invalid(key, value, origin))
    }
}

fn whistle_key(key: &str, value: &str, origin: &str) -> Result<String, ConfigError> {
    WHISTLE_KEYS
        .iter()
        .find(|k| k.eq_ignore_ascii_case(value.trim()))
        .map(|k| k.to_string())
        .ok_or_else(|| invalid(key, value, origin))
}

fn bool_value(key: &str, value: &toml::Value, origin: &str) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(key, &value.to_string(), origin))
}

fn env_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "environment")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_cli_path_comes_last() {
        let files = discover_config_files_with_override(Some(Path::new("/nonexistent/abctab.toml")));
        assert_eq!(files.last(), Some(&PathBuf::from("/nonexistent/abctab.toml")));
    }

    #[test]
    fn test_apply_partial_toml() {
        let mut config = TabConfig::default();
        config.tablature.whistle_key = "G".to_string();

        apply_toml(
            &mut config,
            "[tablature]\ninstrument = \"Fiddle\"\n",
            Path::new("test.toml"),
        )
        .unwrap();

        assert_eq!(config.tablature.instrument, "fiddle");
        // Keys the file does not set are kept
        assert_eq!(config.tablature.whistle_key, "G");
        assert!(config.transpose.bar_accidentals);
    }

    #[test]
    fn test_apply_full_toml() {
        let toml = r#"
[tablature]
instrument = "whistle"
whistle_key = "bb"
auto_whistle_key = false
skip_repeated = true

[transpose]
bar_accidentals = false

[logging]
level = "abc=trace"
"#;
        let mut config = TabConfig::default();
        apply_toml(&mut config, toml, Path::new("test.toml")).unwrap();

        assert_eq!(config.tablature.whistle_key, "Bb");
        assert!(!config.tablature.auto_whistle_key);
        assert!(config.tablature.skip_repeated);
        assert!(!config.transpose.bar_accidentals);
        assert_eq!(config.logging.level, "abc=trace");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = TabConfig::default();

        let err = apply_toml(
            &mut config,
            "[tablature]\nwhistle_key = \"E\"\n",
            Path::new("test.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "tablature.whistle_key"));

        let err = apply_toml(
            &mut config,
            "[transpose]\nbar_accidentals = \"yes\"\n",
            Path::new("test.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_error() {
        let mut config = TabConfig::default();
        let err = apply_toml(&mut config, "[tablature", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tablature]\nskip_repeated = true").unwrap();

        let mut config = TabConfig::default();
        load_from_file(&mut config, file.path()).unwrap();
        assert!(config.tablature.skip_repeated);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TabConfig::default();

        let err = load_from_file(&mut config, &dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TabConfig::default();
        let mut sources = ConfigSources::default();

        apply_env_overrides(
            &mut config,
            &mut sources,
            env(&[
                ("ABCTAB_INSTRUMENT", "violin"),
                ("ABCTAB_SKIP_REPEATED", "yes"),
                ("ABCTAB_LOG_LEVEL", "info"),
                ("RUST_LOG", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(config.tablature.instrument, "violin");
        assert!(config.tablature.skip_repeated);
        // RUST_LOG wins over ABCTAB_LOG_LEVEL
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            sources.env_overrides,
            vec!["ABCTAB_INSTRUMENT", "ABCTAB_SKIP_REPEATED", "ABCTAB_LOG_LEVEL", "RUST_LOG"]
        );
    }

    #[test]
    fn test_env_bad_bool() {
        let mut config = TabConfig::default();
        let mut sources = ConfigSources::default();

        let err = apply_env_overrides(
            &mut config,
            &mut sources,
            env(&[("ABCTAB_BAR_ACCIDENTALS", "maybe")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref origin, .. } if origin == "environment"));
    }
}

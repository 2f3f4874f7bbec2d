//! Configuration sections and their compiled defaults.

use serde::{Deserialize, Serialize};

/// Instruments the tab command knows about.
pub const INSTRUMENTS: &[&str] = &["whistle", "fiddle", "violin"];

/// Whistle keys with a fingering chart.
pub const WHISTLE_KEYS: &[&str] = &["D", "C", "G", "A", "Bb", "F", "Eb"];

/// How tablature is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablatureConfig {
    #[serde(default = "TablatureConfig::default_instrument")]
    pub instrument: String,

    /// Whistle used when none is given and none is recommended
    #[serde(default = "TablatureConfig::default_whistle_key")]
    pub whistle_key: String,

    /// Pick the whistle from the tune's key when none is given
    #[serde(default = "TablatureConfig::default_auto_whistle_key")]
    pub auto_whistle_key: bool,

    /// Blank fingerings that repeat the previous note's
    #[serde(default)]
    pub skip_repeated: bool,
}

impl TablatureConfig {
    fn default_instrument() -> String {
        "whistle".to_string()
    }

    fn default_whistle_key() -> String {
        "D".to_string()
    }

    fn default_auto_whistle_key() -> bool {
        true
    }
}

impl Default for TablatureConfig {
    fn default() -> Self {
        Self {
            instrument: Self::default_instrument(),
            whistle_key: Self::default_whistle_key(),
            auto_whistle_key: Self::default_auto_whistle_key(),
            skip_repeated: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransposeConfig {
    /// Track accidentals through the bar when respelling notes
    #[serde(default = "TransposeConfig::default_bar_accidentals")]
    pub bar_accidentals: bool,
}

impl TransposeConfig {
    fn default_bar_accidentals() -> bool {
        true
    }
}

impl Default for TransposeConfig {
    fn default() -> Self {
        Self {
            bar_accidentals: Self::default_bar_accidentals(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "warn" or "abc=debug"
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tab = TablatureConfig::default();
        assert_eq!(tab.instrument, "whistle");
        assert_eq!(tab.whistle_key, "D");
        assert!(tab.auto_whistle_key);
        assert!(!tab.skip_repeated);

        assert!(TransposeConfig::default().bar_accidentals);
        assert_eq!(LoggingConfig::default().level, "warn");
    }

    #[test]
    fn test_serde_fills_defaults() {
        let tab: TablatureConfig = toml::from_str("instrument = \"fiddle\"").unwrap();
        assert_eq!(tab.instrument, "fiddle");
        assert_eq!(tab.whistle_key, "D");
        assert!(tab.auto_whistle_key);
    }
}

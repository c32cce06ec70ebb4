//! User configuration loaded from `config.toml`.
//!
//! ```toml
//! mode = "programmer"
//! angle_mode = "RAD"
//! base = 16
//! bit_length = 8
//!
//! [history]
//! enabled = true
//! max_items = 100
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::calculator::{AngleMode, Base, BitLength, Calculator, Mode};
use crate::history::{History, MAX_HISTORY_ITEMS};

/// Error raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub angle_mode: AngleMode,

    /// 2, 8, 10 or 16.
    #[serde(default)]
    pub base: Base,

    /// 8, 16, 32 or 64.
    #[serde(default)]
    pub bit_length: BitLength,

    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Defaults to `history.json` under the user data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_max_items() -> usize {
    MAX_HISTORY_ITEMS
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: None,
            max_items: default_max_items(),
        }
    }
}

impl HistoryConfig {
    /// Where history is stored, if anywhere.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(History::default_path)
    }
}

impl Config {
    /// Default location: `<config dir>/calcdeck/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calcdeck").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        if config.history.max_items == 0 {
            warn!("history.max_items must be positive, using {}", MAX_HISTORY_ITEMS);
            config.history.max_items = MAX_HISTORY_ITEMS;
        }
        Ok(config)
    }

    /// Put `calc` into the configured mode, angle unit, base and width.
    pub fn apply(&self, calc: &mut Calculator) {
        calc.set_base(self.base);
        calc.set_bit_length(self.bit_length);
        calc.set_angle_mode(self.angle_mode);
        calc.set_mode(self.mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.history.enabled);
        assert_eq!(config.history.max_items, 100);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            mode = "programmer"
            angle_mode = "RAD"
            base = 16
            bit_length = 8

            [history]
            enabled = false
            path = "/tmp/calc-history.json"
            max_items = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, Mode::Programmer);
        assert_eq!(config.angle_mode, AngleMode::Rad);
        assert_eq!(config.base, Base::Hex);
        assert_eq!(config.bit_length, BitLength::Byte);
        assert!(!config.history.enabled);
        assert_eq!(config.history.max_items, 20);
        assert_eq!(
            config.history.resolved_path(),
            Some(PathBuf::from("/tmp/calc-history.json"))
        );
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(Config::parse("base = 3").is_err());
        assert!(Config::parse("bit_length = 12").is_err());
        assert!(Config::parse(r#"mode = "graphing""#).is_err());
    }

    #[test]
    fn test_zero_max_items_replaced() {
        let config = Config::parse("[history]\nmax_items = 0").unwrap();
        assert_eq!(config.history.max_items, MAX_HISTORY_ITEMS);
    }

    #[test]
    fn test_apply() {
        let config = Config::parse("mode = \"programmer\"\nbase = 2\nbit_length = 16").unwrap();
        let mut calc = Calculator::new();
        config.apply(&mut calc);

        let state = calc.state();
        assert_eq!(state.mode, Mode::Programmer);
        assert_eq!(state.base, Base::Bin);
        assert_eq!(state.bit_length, BitLength::Word);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(missing.as_path())),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "angle_mode = \"RAD\"").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.angle_mode, AngleMode::Rad);
        assert_eq!(config.mode, Mode::Standard);
    }
}

//! Configuration for the CLI: where table data lives and how chatty the
//! logs are. Stored as TOML (`worldbuilder.toml`); a missing file simply
//! means defaults, since the whole system is usable with zero setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `tables/<key>.json` slots.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter: error, warn, info, debug, trace.
    pub level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let config: Config =
            toml::from_str(&text).with_context(|| format!("failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from a TOML file, or fall back to defaults when it is absent.
    /// A present-but-broken file is still an error; silently ignoring a
    /// typo'd config would be worse than stopping.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Write a commented starter config.
    pub fn create_default(path: &str) -> Result<()> {
        let text = "\
# worldbuilder configuration

[storage]
# Directory holding the editable table slots (tables/<domain>.json)
data_dir = \"data\"

[logging]
# error, warn, info, debug, trace
level = \"warn\"
";
        fs::write(path, text).with_context(|| format!("failed to write config file: {path}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let config: Config = toml::from_str("[storage]\ndata_dir = \"elsewhere\"\n").unwrap();
        assert_eq!(config.storage.data_dir, "elsewhere");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn create_default_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worldbuilder.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).unwrap();
        let config = Config::load(path).unwrap();
        assert_eq!(config.storage.data_dir, "data");
    }

    #[test]
    fn missing_file_defaults() {
        let config = Config::load_or_default("/definitely/not/here.toml").unwrap();
        assert_eq!(config.storage.data_dir, "data");
    }
}

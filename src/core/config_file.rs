//! User configuration file handling
//!
//! Manages settings from ~/.config/matra-variants/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "matra-variants";
const SETTINGS_FILE: &str = "settings.json";

/// Log filter used when neither the CLI, RUST_LOG nor the settings set one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// User configuration from ~/.config/matra-variants/settings.json
///
/// These settings override built-in defaults but are overridden by CLI arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Log filter in EnvFilter syntax (e.g., "info", "matra_variants=debug")
    #[serde(default)]
    pub default_log_filter: Option<String>,
    /// Always write logs to the dated log file
    #[serde(default)]
    pub log_to_file: Option<bool>,
}

impl ConfigFile {
    /// Get the path to the matra-variants config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join(APP_DIR)
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join(SETTINGS_FILE)
    }

    /// Load configuration from the user config file
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a settings file.
    ///
    /// A missing file gives `None`; an unreadable or malformed one is
    /// reported and also gives `None`, so a bad settings file never stops a
    /// run.
    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded user settings from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", SETTINGS_FILE, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", SETTINGS_FILE, e);
                None
            }
        }
    }

    /// Save configuration to a settings file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Settings written by `--new-config`
    pub fn example() -> Self {
        ConfigFile {
            default_log_filter: Some(DEFAULT_LOG_FILTER.to_string()),
            log_to_file: Some(false),
        }
    }

    /// Log filter with CLI > settings > built-in priority
    pub fn log_filter(&self, cli_filter: Option<&str>) -> String {
        cli_filter
            .map(str::to_string)
            .or_else(|| self.default_log_filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    /// Whether to log to file; the CLI flag can only turn it on
    pub fn log_to_file(&self, cli_flag: bool) -> bool {
        cli_flag || self.log_to_file.unwrap_or(false)
    }

    /// Initialize the user configuration directory
    ///
    /// This creates:
    /// 1. The ~/.config/matra-variants directory structure
    /// 2. A settings.json file with default values
    /// 3. A logs/ directory for file logging
    pub fn initialize_config_directory() -> anyhow::Result<()> {
        let config_dir = Self::config_dir();

        fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {:?}", config_dir);

        let logs_dir = crate::logging::logs_dir();
        fs::create_dir_all(&logs_dir)?;
        println!("Created logs directory: {:?}", logs_dir);

        let settings_path = Self::config_path();
        if !settings_path.exists() {
            Self::example().save_to(&settings_path)?;
            println!("Created settings file: {:?}", settings_path);
        } else {
            println!("Settings file already exists: {:?}", settings_path);
        }

        println!("\nConfiguration initialized successfully!");
        println!("You can now:");
        println!("  - Edit settings at: {:?}", settings_path);
        println!("  - View log files in: {:?}", logs_dir);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        ConfigFile::example().save_to(&path).unwrap();
        assert_eq!(ConfigFile::load_from(&path), Some(ConfigFile::example()));
    }

    #[test]
    fn missing_or_broken_settings_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        assert_eq!(ConfigFile::load_from(&path), None);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(ConfigFile::load_from(&path), None);
    }

    #[test]
    fn partial_settings_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "log_to_file": true }"#).unwrap();
        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.default_log_filter, None);
        assert!(config.log_to_file(false));
    }

    #[test]
    fn cli_overrides_settings() {
        let config = ConfigFile {
            default_log_filter: Some("warn".to_string()),
            log_to_file: None,
        };
        assert_eq!(config.log_filter(Some("debug")), "debug");
        assert_eq!(config.log_filter(None), "warn");
        assert_eq!(ConfigFile::default().log_filter(None), DEFAULT_LOG_FILTER);
        assert!(!config.log_to_file(false));
        assert!(config.log_to_file(true));
    }
}

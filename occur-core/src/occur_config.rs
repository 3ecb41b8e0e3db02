//! Global occur configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{OccurrenceError, OccurrenceResult};

static DEFAULT_DATA_DIR: &str = "~/events";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Global configuration at ~/.config/occur/config.toml
///
/// Any key can be overridden with an `OCCUR_`-prefixed environment variable,
/// e.g. `OCCUR_DATA_DIR`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OccurConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_event: Option<String>,
}

impl Default for OccurConfig {
    fn default() -> Self {
        OccurConfig {
            data_dir: default_data_dir(),
            default_event: None,
        }
    }
}

impl OccurConfig {
    pub fn config_path() -> OccurrenceResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| OccurrenceError::Config("Could not determine config directory".into()))?
            .join("occur");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path, creating a commented default file
    /// on first use.
    pub fn load() -> OccurrenceResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional) layered under `OCCUR_*` environment variables.
    pub fn load_from(path: &Path) -> OccurrenceResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("OCCUR"))
            .build()
            .map_err(|e| OccurrenceError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| OccurrenceError::Config(e.to_string()))
    }

    /// `data_dir` with a leading `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> OccurrenceResult<()> {
        let contents = format!(
            "\
# occur configuration

# Where event definitions and their exceptions live:
# data_dir = \"{}\"

# Event used when a command is given no --event:
# default_event = \"standup\"
",
            DEFAULT_DATA_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                OccurrenceError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| OccurrenceError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occur").join("config.toml");

        OccurConfig::create_default_config(&path).unwrap();
        let config = OccurConfig::load_from(&path).unwrap();

        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert!(config.default_event.is_none());
    }

    #[test]
    fn test_config_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/srv/events\"\ndefault_event = \"standup\"\n").unwrap();

        let config = OccurConfig::load_from(&path).unwrap();

        assert_eq!(config.data_path(), PathBuf::from("/srv/events"));
        assert_eq!(config.default_event.as_deref(), Some("standup"));
    }

    #[test]
    fn test_data_path_expands_tilde() {
        let config = OccurConfig::default();

        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}

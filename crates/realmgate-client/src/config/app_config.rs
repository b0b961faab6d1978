use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::automation_config::AutomationConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Config file not found")]
    NotFound,
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("IO error reading config: {0}")]
    IoError(String),
}

/// Application-wide settings, stored as TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server picked on the most recent launch
    #[serde(default)]
    pub last_server: String,

    /// Expansion picked on the most recent launch
    #[serde(default)]
    pub last_expansion: String,

    #[serde(default)]
    pub automation: AutomationConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound);
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigLoadError::IoError(e.to_string()))?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config, writing defaults first when the file does not exist yet
    pub fn load_or_init(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ConfigLoadError::NotFound) => {
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self)?;
        fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn update_last_used(
        &mut self,
        path: &Path,
        server: &str,
        expansion: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.last_server = server.to_string();
        self.last_expansion = expansion.to_string();
        self.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(&dir.path().join("config.toml"));
        assert!(matches!(result, Err(ConfigLoadError::NotFound)));
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig::load_or_init(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_last_used_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config
            .update_last_used(&path, "StormForge", "TBC 2.4.3")
            .unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.last_server, "StormForge");
        assert_eq!(loaded.last_expansion, "TBC 2.4.3");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "last_server = [").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigLoadError::ParseError(_))
        ));
    }

    #[test]
    fn test_automation_section_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
last_server = "Warmane"

[automation]
warm_up_ms = 15000
"#,
        )
        .unwrap();
        assert_eq!(config.last_server, "Warmane");
        assert_eq!(config.automation.warm_up_ms, 15000);
        assert_eq!(config.automation.max_attempts, 40);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config: AppConfig = toml::from_str(
            r#"
theme = "default"
auto_update_check = true
last_expansion = "MoP 5.4.8"
"#,
        )
        .unwrap();
        assert_eq!(config.last_expansion, "MoP 5.4.8");
        assert!(config.last_server.is_empty());
    }
}

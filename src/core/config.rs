//! Application configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::input_classifier::ExtensionLocatorSupport;
use super::task_builder::{BuilderConfig, ThreadCountRange};
use crate::utils::file_utils::normalize_folder;

/// Program name shown when no usable downloader binary is configured
pub const DEFAULT_DOWNLOADER_PROGRAM: &str = "N_m3u8DL-RE";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Main application configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub download: DownloadConfig,
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Download-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadConfig {
    pub save_folder: String,
    pub thread_count: u32,
    pub thread_count_min: u32,
    pub thread_count_max: u32,
    /// Clear the add-task form after a successful submission
    pub auto_reset_link: bool,
    /// Path of the N_m3u8DL-RE binary
    pub downloader_path: Option<String>,
    pub supported_extensions: Vec<String>,
}

/// Advanced configuration options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvancedConfig {
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            save_folder: "downloads".to_string(),
            thread_count: 8,
            thread_count_min: 1,
            thread_count_max: 64,
            auto_reset_link: false,
            downloader_path: None,
            supported_extensions: vec!["m3u8".to_string(), "mpd".to_string()],
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file, creating default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load the stored configuration, falling back to defaults when it is
    /// missing or invalid. Never writes to disk.
    pub fn load_or_default() -> Self {
        let loaded = Self::get_config_path().and_then(|path| {
            if path.exists() {
                Self::load_from(&path).map(Some)
            } else {
                Ok(None)
            }
        });

        match loaded {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!("No configuration file found, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load and validate configuration from the given file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;

        tracing::info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = self.export()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Saved configuration to: {:?}", path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "m3u8dl", "task-builder")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Parse and validate configuration from a JSON string
    pub fn import(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse imported configuration")?;

        config
            .validate()
            .with_context(|| "Imported configuration is invalid")?;

        tracing::info!("Imported and validated configuration from JSON");
        Ok(config)
    }

    /// Store a save folder chosen by the user, using forward slashes
    pub fn set_save_folder(&mut self, folder: &str) {
        self.download.save_folder = normalize_folder(folder);
    }

    pub fn thread_count_range(&self) -> ThreadCountRange {
        ThreadCountRange::new(self.download.thread_count_min, self.download.thread_count_max)
    }

    /// Settings passed to the task builder
    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig::new(
            self.download.save_folder.clone(),
            self.download.thread_count,
            self.thread_count_range(),
        )
    }

    /// Locator predicate built from the configured extensions
    pub fn locator_support(&self) -> ExtensionLocatorSupport {
        ExtensionLocatorSupport::new(&self.download.supported_extensions)
    }

    /// The downloader binary is configured and exists on disk
    pub fn downloader_available(&self) -> bool {
        self.download
            .downloader_path
            .as_deref()
            .map(|path| Path::new(path).is_file())
            .unwrap_or(false)
    }

    /// Configured downloader binary when it exists, otherwise the bare program name
    pub fn downloader_program(&self) -> &str {
        match self.download.downloader_path.as_deref() {
            Some(path) if self.downloader_available() => path,
            _ => DEFAULT_DOWNLOADER_PROGRAM,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let download = &self.download;

        if download.save_folder.trim().is_empty() {
            anyhow::bail!("Save folder must not be empty");
        }

        if download.thread_count_min == 0 {
            anyhow::bail!("Minimum thread count must be greater than 0");
        }

        if download.thread_count_min > download.thread_count_max {
            anyhow::bail!(
                "Thread count range is inverted: {} > {}",
                download.thread_count_min,
                download.thread_count_max
            );
        }

        if !self.thread_count_range().contains(download.thread_count) {
            anyhow::bail!(
                "Thread count should be between {} and {}",
                download.thread_count_min,
                download.thread_count_max
            );
        }

        if download
            .supported_extensions
            .iter()
            .all(|ext| ext.trim().trim_start_matches('.').is_empty())
        {
            anyhow::bail!("At least one supported extension is required");
        }

        if !LOG_LEVELS.contains(&self.advanced.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = config.export().unwrap();
        let parsed_config = AppConfig::import(&json).unwrap();
        assert_eq!(config, parsed_config);
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = AppConfig::default();
        config.download.save_folder = "  ".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.download.thread_count_min = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.download.thread_count_min = 32;
        config.download.thread_count_max = 16;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.download.thread_count = 65;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.download.supported_extensions = vec![".".to_string()];
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.advanced.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_save_folder() {
        let mut config = AppConfig::default();
        config.set_save_folder("C:\\Users\\me\\Videos");
        assert_eq!(config.download.save_folder, "C:/Users/me/Videos");
    }

    #[test]
    fn test_builder_config_projection() {
        let mut config = AppConfig::default();
        config.download.save_folder = "/d".to_string();
        config.download.thread_count = 16;

        let builder_config = config.builder_config();
        assert_eq!(builder_config.save_directory, "/d");
        assert_eq!(builder_config.thread_count, 16);
        assert_eq!(builder_config.thread_count_range, ThreadCountRange::new(1, 64));
    }

    #[test]
    fn test_downloader_available() {
        let mut config = AppConfig::default();
        assert!(!config.downloader_available());

        config.download.downloader_path = Some("/definitely/missing/N_m3u8DL-RE".to_string());
        assert!(!config.downloader_available());
        assert_eq!(config.downloader_program(), DEFAULT_DOWNLOADER_PROGRAM);

        let binary = tempfile::NamedTempFile::new().unwrap();
        let path = binary.path().to_string_lossy().into_owned();
        config.download.downloader_path = Some(path.clone());
        assert!(config.downloader_available());
        assert_eq!(config.downloader_program(), path);

        let dir = tempfile::tempdir().unwrap();
        config.download.downloader_path = Some(dir.path().to_string_lossy().into_owned());
        assert!(!config.downloader_available());
    }
}

//! Configuration loading and merging
//!
//! TOML configuration from the user config directory, merged with
//! CLI overrides. CLI values always take precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config directory name under the platform config root
pub const CONFIG_DIR: &str = "reflow-pdf";

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

// ============================================================
// Error Types
// ============================================================

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================
// Config
// ============================================================

/// Conversion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raster resolution handed to the PDF rasterizer
    pub dpi: u32,

    /// External OCR backend command. Must emit one tab-separated
    /// record per recognized line (see the `ocr` module docs).
    pub ocr_command: String,

    /// Run the formula detection pass
    pub detect_formulas: bool,

    /// Write page sections as soon as their blocks arrive
    pub streaming: bool,

    /// Write a metadata sidecar next to the output document
    pub generate_metadata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dpi: 150,
            ocr_command: "ocr-lines".to_string(),
            detect_formulas: true,
            streaming: true,
            generate_metadata: false,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when
    /// no config file exists
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default config file path for this platform
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Merge with CLI overrides; CLI values win
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> Config {
        Config {
            dpi: cli.dpi.unwrap_or(self.dpi),
            ocr_command: cli
                .ocr_command
                .clone()
                .unwrap_or_else(|| self.ocr_command.clone()),
            detect_formulas: cli.detect_formulas.unwrap_or(self.detect_formulas),
            streaming: cli.streaming.unwrap_or(self.streaming),
            generate_metadata: cli.generate_metadata.unwrap_or(self.generate_metadata),
        }
    }
}

/// Optional overrides collected from command-line arguments
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dpi: Option<u32>,
    pub ocr_command: Option<String>,
    pub detect_formulas: Option<bool>,
    pub streaming: Option<bool>,
    pub generate_metadata: Option<bool>,
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dpi, 150);
        assert!(config.detect_formulas);
        assert!(config.streaming);
        assert!(!config.generate_metadata);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "dpi = 300\nocr_command = \"my-ocr\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.ocr_command, "my-ocr");
        // Unspecified fields keep their defaults.
        assert!(config.streaming);
    }

    #[test]
    fn test_load_from_path_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "dpi = \"not a number\"").unwrap();

        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_merge_with_cli_precedence() {
        let config = Config::default();
        let overrides = CliOverrides {
            dpi: Some(600),
            streaming: Some(false),
            ..Default::default()
        };

        let merged = config.merge_with_cli(&overrides);
        assert_eq!(merged.dpi, 600);
        assert!(!merged.streaming);
        // Untouched fields pass through from the file config.
        assert_eq!(merged.ocr_command, config.ocr_command);
        assert_eq!(merged.detect_formulas, config.detect_formulas);
    }
}

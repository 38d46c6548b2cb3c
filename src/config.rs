// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! Settings are stored as pretty-printed JSON under the user config
//! directory. A missing or unreadable file falls back to defaults; stream
//! geometry is fixed by [`crate::constants`] and deliberately not
//! configurable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::APP_NAME;

/// Which frame source implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SourceKind {
    /// V4L2 capture devices (default)
    #[default]
    V4l2,
    /// Built-in synthetic pattern source
    Synthetic,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::V4l2 => write!(f, "V4L2"),
            SourceKind::Synthetic => write!(f, "synthetic"),
        }
    }
}

fn default_color_device() -> String {
    "/dev/video0".to_string()
}

fn default_depth_device() -> String {
    "/dev/video1".to_string()
}

fn default_show_status_bar() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Frame source implementation
    #[serde(default)]
    pub source: SourceKind,
    /// V4L2 device path for the color stream
    #[serde(default = "default_color_device")]
    pub color_device: String,
    /// V4L2 device path for the depth stream
    #[serde(default = "default_depth_device")]
    pub depth_device: String,
    /// Snapshot output directory (None = ~/Pictures/depth-viewer)
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
    /// Show the one-line status bar under the panels
    #[serde(default = "default_show_status_bar")]
    pub show_status_bar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            color_device: default_color_device(),
            depth_device: default_depth_device(),
            snapshot_dir: None,
            show_status_bar: true,
        }
    }
}

impl Config {
    /// Path of the config file, if a config directory exists
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.json"))
    }

    /// Load the config file, falling back to defaults when missing or
    /// unreadable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::load_from_file(&path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) => {
                info!(path = %path.display(), reason = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, data)
    }

    /// Write the config file, creating the directory if needed
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory available",
            ));
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.save_to_file(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source, SourceKind::V4l2);
        assert_eq!(config.color_device, "/dev/video0");
        assert_eq!(config.depth_device, "/dev/video1");
        assert!(config.show_status_bar);
        assert!(config.snapshot_dir.is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = Config::default();
        config.source = SourceKind::Synthetic;
        config.snapshot_dir = Some(PathBuf::from("/tmp/shots"));

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Config::default());
    }
}

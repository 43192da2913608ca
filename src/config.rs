// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from a YAML file. Every field has a default, so a
//! partial file (or none at all) is fine.

use crate::error::LoadError;
use crate::render::fonts::FontDescriptor;
use crate::util::geometry::{Size, DEFAULT_VIEWPORT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WALLPAPER_REGIONS_CONFIG";

/// Config file looked for in the working directory.
pub const CONFIG_FILE: &str = "wallpaper-regions.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub directory: PathBuf,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            directory: PathBuf::from("auto_save"),
        }
    }
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { jpeg_quality: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub autosave: AutosaveConfig,
    pub default_viewport: Size,
    /// Tried before the platform's own font list.
    pub fonts: Vec<FontDescriptor>,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            autosave: AutosaveConfig::default(),
            default_viewport: DEFAULT_VIEWPORT,
            fonts: Vec::new(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&yaml).map_err(|source| LoadError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The file named by `CONFIG_ENV`, else `CONFIG_FILE` if present, else
    /// defaults.
    pub fn load() -> Result<Self, LoadError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }
}

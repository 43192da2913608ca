// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module reads and writes the JSON project file and the autosave file.
//! Both carry the same region array; they differ only in the key naming the
//! background image.

use crate::error::{LoadError, SaveError};
use crate::models::region::Region;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A saved project: the regions plus the image they were drawn on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub image_path: String,
}

/// The periodic autosave snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutosaveData {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub background_image_path: String,
}

impl ProjectData {
    pub fn new(regions: Vec<Region>, image_path: &Path) -> Self {
        Self {
            regions,
            image_path: image_path.to_string_lossy().into_owned(),
        }
    }
}

impl AutosaveData {
    pub fn new(regions: Vec<Region>, image_path: &Path) -> Self {
        Self {
            regions,
            background_image_path: image_path.to_string_lossy().into_owned(),
        }
    }
}

/// Export project data to JSON format.
pub fn export_json<T: Serialize>(data: &T, path: &Path) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Import project data from JSON format.
pub fn import_json(path: &Path) -> Result<ProjectData, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

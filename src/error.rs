// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for loading, saving and editing.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading an image, a project file or the config.
///
/// The operation is aborted and the previous session state is kept.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to parse project {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no image is loaded and the project does not reference one")]
    MissingImage,
}

/// Failures while exporting, saving a project or autosaving.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to serialize project: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("nothing to save: {0}")]
    NothingToSave(&'static str),

    #[error("no image is loaded")]
    NoImage,
}

/// Rejected edits. The region list is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no image is loaded")]
    NoDocument,

    #[error("no region at index {0}")]
    NoSuchRegion(usize),

    #[error("no region is selected")]
    NoSelection,
}

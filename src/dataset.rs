//! Labelled image discovery.
//!
//! The dataset is two directories of scans, one per class. Listing is
//! non-recursive and sorted by path so every run sees the same order
//! before the seeded split.

use crate::error::{Result, TumorscopeError};
use crate::imaging::is_supported_image;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Binary diagnosis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    /// No tumor (label 0).
    Healthy,
    /// Tumor present (label 1, the positive class).
    Tumor,
}

impl Class {
    /// Numeric label used by the classifier.
    #[must_use]
    pub fn label(self) -> usize {
        match self {
            Class::Healthy => 0,
            Class::Tumor => 1,
        }
    }

    /// Directory name used under the augmented output root.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Class::Healthy => "healthy",
            Class::Tumor => "tumor",
        }
    }
}

/// List supported raster files in `dir`, sorted by path.
///
/// # Errors
///
/// Returns `Io` naming the directory if it cannot be read, and
/// `EmptyDataset` if it holds no supported images.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| TumorscopeError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TumorscopeError::io(dir, e))?.path();
        if path.is_file() && is_supported_image(&path) {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(TumorscopeError::empty(format!(
            "no images found in {}",
            dir.display()
        )));
    }
    tracing::debug!(dir = %dir.display(), count = files.len(), "discovered images");
    Ok(files)
}

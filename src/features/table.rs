//! Feature rows and the per-run feature table.

use super::extract::{extract_features, feature_names, FeatureConfig};
use crate::error::{Result, TumorscopeError};
use crate::imaging::{ensure_parent_dir, load_grayscale};
use crate::model_selection::Split;
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Features of one image with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Partition the image was assigned to.
    pub split: Split,
    /// Source file.
    pub path: PathBuf,
    /// 1 for tumor, 0 for healthy.
    pub label: usize,
    /// Cluster feature vector.
    pub values: Vec<f32>,
}

impl FeatureRow {
    /// Load `path` as grayscale and extract its cluster features.
    ///
    /// # Errors
    ///
    /// Fails if the image cannot be read or clustered; the error names the
    /// file in both cases.
    pub fn from_image_path(
        path: &Path,
        label: usize,
        split: Split,
        config: &FeatureConfig,
    ) -> Result<Self> {
        let image = load_grayscale(path)?;
        let features = extract_features(&image, config).map_err(|e| match e {
            TumorscopeError::DegenerateClustering { k, reason } => {
                TumorscopeError::DegenerateClustering {
                    k,
                    reason: format!("{reason} in {}", path.display()),
                }
            }
            other => other,
        })?;
        Ok(Self {
            split,
            path: path.to_path_buf(),
            label,
            values: features.to_vector(),
        })
    }
}

/// Append-only collector for [`FeatureTable`].
#[derive(Debug, Clone)]
pub struct FeatureTableBuilder {
    n_clusters: usize,
    rows: Vec<FeatureRow>,
}

impl FeatureTableBuilder {
    /// New builder for rows extracted with `n_clusters` clusters.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            rows: Vec::new(),
        }
    }

    /// Adds a row.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the row width is not `4 * n_clusters`.
    pub fn push(&mut self, row: FeatureRow) -> Result<()> {
        let expected = 4 * self.n_clusters;
        if row.values.len() != expected {
            return Err(TumorscopeError::dimension_mismatch(
                "feature width",
                expected,
                row.values.len(),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Number of rows collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True before the first push.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Freezes the table.
    #[must_use]
    pub fn build(self) -> FeatureTable {
        FeatureTable {
            n_clusters: self.n_clusters,
            rows: self.rows,
        }
    }
}

/// Immutable set of feature rows for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    n_clusters: usize,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// All rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Width of every feature vector.
    #[must_use]
    pub fn n_features(&self) -> usize {
        4 * self.n_clusters
    }

    /// Number of rows in `split`.
    #[must_use]
    pub fn count(&self, split: Split) -> usize {
        self.rows.iter().filter(|r| r.split == split).count()
    }

    /// Stacks the rows of the given splits into a matrix plus labels.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDataset` if none of the splits has rows.
    pub fn matrix(&self, splits: &[Split]) -> Result<(Matrix<f32>, Vec<usize>)> {
        let selected: Vec<&FeatureRow> = self
            .rows
            .iter()
            .filter(|r| splits.contains(&r.split))
            .collect();
        if selected.is_empty() {
            let names: Vec<&str> = splits.iter().map(|s| s.as_str()).collect();
            return Err(TumorscopeError::empty(format!(
                "no feature rows in split(s) {}",
                names.join("+")
            )));
        }

        let values: Vec<&[f32]> = selected.iter().map(|r| r.values.as_slice()).collect();
        let x = Matrix::from_rows(self.n_features(), &values)
            .map_err(|e| TumorscopeError::Other(e.to_string()))?;
        let y = selected.iter().map(|r| r.label).collect();
        Ok((x, y))
    }

    /// Renders the table as CSV with a `split,path,label,<features>` header.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("split,path,label,");
        csv.push_str(&feature_names(self.n_clusters).join(","));
        csv.push('\n');

        for row in &self.rows {
            let _ = write!(
                csv,
                "{},{},{}",
                row.split,
                csv_field(&row.path.display().to_string()),
                row.label
            );
            for v in &row.values {
                let _ = write!(csv, ",{v}");
            }
            csv.push('\n');
        }
        csv
    }

    /// Writes [`Self::to_csv`] to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `Io` naming the path on failure.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        fs::write(path, self.to_csv()).map_err(|e| TumorscopeError::io(path, e))?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "wrote feature table");
        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

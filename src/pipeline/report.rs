//! Run summary, printed to the console and optionally saved as JSON.

use super::evaluation::{SplitMetrics, ThresholdSelection};
use crate::cluster::ElbowPoint;
use crate::error::{Result, TumorscopeError};
use crate::imaging::ensure_parent_dir;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Image counts at each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetCounts {
    /// Tumor source images.
    pub tumor_sources: usize,
    /// Non-tumor source images.
    pub healthy_sources: usize,
    /// Augmented images across both classes.
    pub augmented: usize,
    /// Training rows.
    pub train: usize,
    /// Validation rows.
    pub val: usize,
    /// Test rows.
    pub test: usize,
}

/// Everything a run produced besides the model itself.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Stage counts.
    pub counts: DatasetCounts,
    /// Elbow curve over the sampled training images, if computed.
    pub elbow_curve: Option<Vec<ElbowPoint>>,
    /// Number of intensity clusters used for features.
    pub n_clusters: usize,
    /// Rounds selected on validation.
    pub best_rounds: usize,
    /// Validation error per round of the monitored fit.
    pub validation_errors: Vec<f32>,
    /// Decision threshold (and sweep when tuned).
    pub threshold: ThresholdSelection,
    /// Metrics of the refit model on train + validation.
    pub train_val: SplitMetrics,
    /// Metrics on the held-out test split.
    pub test: SplitMetrics,
}

impl PipelineReport {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Other` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TumorscopeError::Other(format!("report serialization: {e}")))
    }

    /// Writes [`Self::to_json`] to `path`.
    ///
    /// # Errors
    ///
    /// Returns `Io` naming the path on failure.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        fs::write(path, self.to_json()?).map_err(|e| TumorscopeError::io(path, e))?;
        tracing::info!(path = %path.display(), "wrote report");
        Ok(())
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        writeln!(
            f,
            "images: {} tumor + {} healthy sources, {} augmented",
            c.tumor_sources, c.healthy_sources, c.augmented
        )?;
        writeln!(f, "split:  {} train / {} val / {} test", c.train, c.val, c.test)?;
        if let Some(curve) = &self.elbow_curve {
            write!(f, "elbow: ")?;
            for p in curve {
                write!(f, " k={}:{:.1}", p.k, p.mean_inertia)?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "k = {}, best rounds = {}, threshold = {:.2}",
            self.n_clusters, self.best_rounds, self.threshold.threshold
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.train_val)?;
        writeln!(f)?;
        write!(f, "{}", self.test)
    }
}

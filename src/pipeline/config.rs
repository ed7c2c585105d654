//! Run configuration, loaded from JSON with every field defaulted.

use crate::error::{Result, TumorscopeError};
use crate::features::{ClusterCountPolicy, FeatureConfig};
use crate::model_selection::SplitRatios;
use crate::tree::GradientBoostingClassifier;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::evaluation::ThresholdPolicy;

/// Hyperparameters of the boosted classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    /// Shrinkage applied to every tree.
    pub learning_rate: f32,
    /// Depth of each regression tree.
    pub max_depth: usize,
    /// Minimum rows per leaf.
    pub min_samples_leaf: usize,
    /// Row fraction sampled per round; 1.0 disables sampling.
    pub subsample: f32,
    /// Round cap for the validation-monitored fit.
    pub max_rounds: usize,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            max_rounds: 2500,
        }
    }
}

impl BoostingConfig {
    /// Unfitted classifier with these settings and `rounds` trees.
    #[must_use]
    pub fn classifier(&self, rounds: usize, seed: u64) -> GradientBoostingClassifier {
        GradientBoostingClassifier::new()
            .with_n_estimators(rounds)
            .with_learning_rate(self.learning_rate)
            .with_max_depth(self.max_depth)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_subsample(self.subsample)
            .with_random_state(seed)
    }
}

/// Everything a pipeline run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory of tumor scans.
    pub tumor_dir: PathBuf,
    /// Directory of non-tumor scans.
    pub healthy_dir: PathBuf,
    /// Root for augmented images; one subdirectory per class.
    pub augmented_dir: PathBuf,
    /// Seed for the split, k-means and boosting.
    pub seed: u64,
    /// Train/validation/test fractions per class.
    pub split: SplitRatios,
    /// How k is chosen for feature extraction.
    pub cluster_count: ClusterCountPolicy,
    /// Largest k on the elbow curve; 0 skips the curve.
    pub elbow_max_k: usize,
    /// Training images sampled for the elbow curve.
    pub elbow_sample: usize,
    /// k-means++ restarts per image.
    pub kmeans_restarts: usize,
    /// Classifier settings.
    pub boosting: BoostingConfig,
    /// Decision threshold policy.
    pub threshold: ThresholdPolicy,
    /// Optional CSV dump of the feature table.
    pub features_csv: Option<PathBuf>,
    /// Optional JSON report destination.
    pub report_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tumor_dir: PathBuf::from("data/yes"),
            healthy_dir: PathBuf::from("data/no"),
            augmented_dir: PathBuf::from("data/augmented"),
            seed: 42,
            split: SplitRatios::default(),
            cluster_count: ClusterCountPolicy::default(),
            elbow_max_k: 10,
            elbow_sample: 20,
            kmeans_restarts: 50,
            boosting: BoostingConfig::default(),
            threshold: ThresholdPolicy::default(),
            features_csv: None,
            report_path: None,
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON config; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Config` if it does not
    /// parse or fails [`Self::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| TumorscopeError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| TumorscopeError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Feature extraction settings for a chosen k.
    #[must_use]
    pub fn feature_config(&self, n_clusters: usize) -> FeatureConfig {
        FeatureConfig {
            n_clusters,
            n_init: self.kmeans_restarts,
            seed: self.seed,
        }
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        self.split
            .validate()
            .map_err(|e| TumorscopeError::Config(e.to_string()))?;
        if self.kmeans_restarts == 0 {
            return Err(TumorscopeError::Config("kmeans_restarts must be >= 1".into()));
        }
        if let ClusterCountPolicy::Fixed(0) = self.cluster_count {
            return Err(TumorscopeError::Config("cluster_count must be >= 1".into()));
        }
        if self.cluster_count == ClusterCountPolicy::Elbow
            && (self.elbow_max_k < 3 || self.elbow_sample == 0)
        {
            return Err(TumorscopeError::Config(
                "elbow policy needs elbow_max_k >= 3 and elbow_sample >= 1".into(),
            ));
        }
        if self.boosting.max_rounds == 0 {
            return Err(TumorscopeError::Config("boosting.max_rounds must be >= 1".into()));
        }
        if let ThresholdPolicy::Fixed(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(TumorscopeError::Config(format!(
                    "threshold {t} must be in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

//! End-to-end batch run: discover, augment, split, extract, train, evaluate.
//!
//! # Example
//!
//! ```no_run
//! use tumorscope::pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_json_file("run.json".as_ref()).unwrap();
//! let report = Pipeline::new(config).run().unwrap();
//! println!("{report}");
//! ```

pub mod config;
pub mod evaluation;
pub mod report;
pub mod trainer;

pub use config::{BoostingConfig, PipelineConfig};
pub use evaluation::{
    best_threshold, evaluate_split, threshold_sweep, SplitMetrics, ThresholdPoint,
    ThresholdPolicy, ThresholdSelection,
};
pub use report::{DatasetCounts, PipelineReport};
pub use trainer::{select_rounds, train, TrainedModel};

use crate::cluster::ElbowPoint;
use crate::dataset::{discover, Class};
use crate::error::Result;
use crate::features::{
    image_elbow_curve, ClusterCountPolicy, FeatureRow, FeatureTable, FeatureTableBuilder,
};
use crate::imaging::{augment_class, load_grayscale};
use crate::model_selection::{shuffle_indices, stratified_three_way_split, Split, ThreeWaySplit};
use std::path::PathBuf;

/// A configured pipeline run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Wraps a configuration.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Executes every stage in order.
    ///
    /// # Errors
    ///
    /// The first failure aborts the run; the error is wrapped in
    /// `TumorscopeError::Stage` naming the stage, and its cause names the
    /// offending file where there is one.
    pub fn run(&self) -> Result<PipelineReport> {
        let cfg = &self.config;
        cfg.validate().map_err(|e| e.in_stage("config"))?;

        tracing::info!(
            tumor = %cfg.tumor_dir.display(),
            healthy = %cfg.healthy_dir.display(),
            "discovering images"
        );
        let tumor_sources = discover(&cfg.tumor_dir).map_err(|e| e.in_stage("discovery"))?;
        let healthy_sources = discover(&cfg.healthy_dir).map_err(|e| e.in_stage("discovery"))?;

        tracing::info!(out = %cfg.augmented_dir.display(), "augmenting");
        let augmented = [
            (Class::Tumor, &tumor_sources),
            (Class::Healthy, &healthy_sources),
        ]
        .into_iter()
        .map(|(class, sources)| {
            augment_class(sources, &cfg.augmented_dir.join(class.dir_name()))
        })
        .collect::<Result<Vec<_>>>()
        .map_err(|e| e.in_stage("augment"))?;

        let splits = stratified_three_way_split(&augmented, cfg.split, cfg.seed)
            .map_err(|e| e.in_stage("split"))?;
        let (tumor_split, healthy_split) = (&splits[0], &splits[1]);
        let count = |s: Split| tumor_split.get(s).len() + healthy_split.get(s).len();
        let counts = DatasetCounts {
            tumor_sources: tumor_sources.len(),
            healthy_sources: healthy_sources.len(),
            augmented: augmented.iter().map(Vec::len).sum(),
            train: count(Split::Train),
            val: count(Split::Val),
            test: count(Split::Test),
        };
        tracing::info!(
            train = counts.train,
            val = counts.val,
            test = counts.test,
            "split dataset"
        );

        let elbow_curve = self
            .elbow_curve(tumor_split, healthy_split)
            .map_err(|e| e.in_stage("elbow"))?;
        let n_clusters = cfg
            .cluster_count
            .resolve(elbow_curve.as_deref())
            .map_err(|e| e.in_stage("elbow"))?;
        tracing::info!(n_clusters, "cluster count");

        let table = self
            .extract(n_clusters, tumor_split, healthy_split)
            .map_err(|e| e.in_stage("features"))?;
        if let Some(path) = &cfg.features_csv {
            table.write_csv(path).map_err(|e| e.in_stage("features"))?;
        }

        let (x_train, y_train) = table.matrix(&[Split::Train]).map_err(|e| e.in_stage("train"))?;
        let (x_val, y_val) = table.matrix(&[Split::Val]).map_err(|e| e.in_stage("train"))?;
        let (x_test, y_test) = table.matrix(&[Split::Test]).map_err(|e| e.in_stage("evaluate"))?;

        let model = train(
            (&x_train, &y_train),
            (&x_val, &y_val),
            &cfg.boosting,
            cfg.threshold,
            cfg.seed,
        )
        .map_err(|e| e.in_stage("train"))?;

        let threshold = model.threshold.threshold;
        let evaluate = || -> Result<(SplitMetrics, SplitMetrics)> {
            let (x_fit, y_fit) = table.matrix(&[Split::Train, Split::Val])?;
            let fit_metrics =
                evaluate_split("train+val", &model.predict_proba(&x_fit)?, &y_fit, threshold)?;
            let test_metrics =
                evaluate_split("test", &model.predict_proba(&x_test)?, &y_test, threshold)?;
            Ok((fit_metrics, test_metrics))
        };
        let (train_val, test) = evaluate().map_err(|e| e.in_stage("evaluate"))?;
        tracing::info!(
            test_accuracy = test.accuracy,
            test_auc = ?test.auc,
            "evaluation complete"
        );

        let report = PipelineReport {
            counts,
            elbow_curve,
            n_clusters,
            best_rounds: model.best_rounds,
            validation_errors: model.validation_errors,
            threshold: model.threshold,
            train_val,
            test,
        };
        if let Some(path) = &cfg.report_path {
            report.write_json(path).map_err(|e| e.in_stage("report"))?;
        }
        Ok(report)
    }

    /// Elbow curve over a seeded sample of training images.
    ///
    /// Skipped when `elbow_max_k` is 0 and the policy does not need it.
    /// Under a fixed cluster count the curve is informational, so a sweep
    /// that cannot be computed is reported as `None`.
    fn elbow_curve(
        &self,
        tumor: &ThreeWaySplit<PathBuf>,
        healthy: &ThreeWaySplit<PathBuf>,
    ) -> Result<Option<Vec<ElbowPoint>>> {
        let cfg = &self.config;
        let needed = cfg.cluster_count == ClusterCountPolicy::Elbow;
        if cfg.elbow_max_k == 0 && !needed {
            return Ok(None);
        }

        let train: Vec<&PathBuf> = tumor.train.iter().chain(&healthy.train).collect();
        let sample = shuffle_indices(train.len(), cfg.seed)
            .into_iter()
            .take(cfg.elbow_sample)
            .map(|i| load_grayscale(train[i]))
            .collect::<Result<Vec<_>>>()?;
        if sample.is_empty() {
            tracing::warn!("no training images for the elbow curve");
            return Ok(None);
        }

        tracing::info!(images = sample.len(), max_k = cfg.elbow_max_k, "elbow curve");
        match image_elbow_curve(&sample, cfg.elbow_max_k, cfg.seed, cfg.kmeans_restarts) {
            Ok(curve) => Ok(Some(curve)),
            Err(e) if !needed => {
                tracing::warn!(error = %e, "elbow curve unavailable, keeping fixed k");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn extract(
        &self,
        n_clusters: usize,
        tumor: &ThreeWaySplit<PathBuf>,
        healthy: &ThreeWaySplit<PathBuf>,
    ) -> Result<FeatureTable> {
        let feature_config = self.config.feature_config(n_clusters);
        let mut builder = FeatureTableBuilder::new(n_clusters);

        for split in Split::ALL {
            for (class, part) in [(Class::Tumor, tumor), (Class::Healthy, healthy)] {
                for path in part.get(split) {
                    tracing::debug!(path = %path.display(), %split, "extracting features");
                    builder.push(FeatureRow::from_image_path(
                        path,
                        class.label(),
                        split,
                        &feature_config,
                    )?)?;
                }
            }
        }
        tracing::info!(rows = builder.len(), "extracted features");
        Ok(builder.build())
    }
}

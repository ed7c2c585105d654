//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use tumorscope::prelude::*;
//! ```

pub use crate::cluster::{elbow_curve, kneedle, ElbowPoint, KMeans};
pub use crate::dataset::{discover, Class};
pub use crate::error::{Result, TumorscopeError};
pub use crate::features::{
    extract_features, ClusterCountPolicy, ClusterFeatures, FeatureConfig, FeatureRow,
    FeatureTable,
};
pub use crate::metrics::{inertia, roc_auc, roc_curve, BinaryConfusion};
pub use crate::model_selection::{stratified_three_way_split, Split, SplitRatios};
pub use crate::pipeline::{Pipeline, PipelineConfig, ThresholdPolicy};
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{BinaryClassifier, UnsupervisedEstimator};
pub use crate::tree::GradientBoostingClassifier;

//! Tumorscope: MRI tumor classification from intensity-cluster features.
//!
//! Each greyscale scan is reduced to a fixed-width vector by clustering its
//! pixel intensities with k-means and summarising every cluster (size, mean
//! intensity, centroid), ordered darkest first. A gradient-boosted
//! classifier is trained on those vectors with the number of rounds chosen
//! on a validation split.
//!
//! # Quick Start
//!
//! ```
//! use image::{GrayImage, Luma};
//! use tumorscope::prelude::*;
//!
//! // Three grey levels with a little texture.
//! let scan = GrayImage::from_fn(12, 8, |x, y| {
//!     Luma([[20u8, 120, 220][(x / 4) as usize] + ((x + y) % 3) as u8])
//! });
//! let config = FeatureConfig { n_clusters: 3, n_init: 5, seed: 42 };
//! let features = extract_features(&scan, &config).unwrap();
//!
//! assert_eq!(features.to_vector().len(), 12);
//! assert!(features.clusters()[0].intensity < features.clusters()[2].intensity);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`dataset`]: Labelled image discovery
//! - [`imaging`]: Image I/O and flip/rotate augmentation
//! - [`model_selection`]: Seeded stratified train/validation/test splits
//! - [`cluster`]: K-Means and the elbow method
//! - [`features`]: Image → cluster feature vector, feature tables
//! - [`tree`]: Regression trees and gradient boosting
//! - [`metrics`]: Confusion counts, accuracy, ROC/AUC, inertia
//! - [`pipeline`]: Configuration, training, evaluation and reporting
//! - [`logging`]: Tracing subscriber setup for the binary

pub mod cluster;
pub mod dataset;
pub mod error;
pub mod features;
pub mod imaging;
pub mod logging;
pub mod metrics;
pub mod model_selection;
pub mod pipeline;
pub mod prelude;
pub mod primitives;
pub mod traits;
pub mod tree;

pub use cluster::{elbow_curve, kneedle, KMeans};
pub use error::{Result, TumorscopeError};
pub use primitives::{Matrix, Vector};
pub use traits::{BinaryClassifier, UnsupervisedEstimator};

//! Evaluation metrics.
//!
//! Clustering (inertia), binary classification (confusion counts, accuracy,
//! sensitivity, specificity) and ranking quality (ROC curve, AUC).

pub mod classification;
pub mod roc;

use crate::primitives::Matrix;

pub use classification::BinaryConfusion;
pub use roc::{roc_auc, roc_curve, RocCurve, RocPoint};

/// Computes the inertia (within-cluster sum of squares).
///
/// Inertia = Σ ||x - centroid||²
///
/// Accumulated in `f64`: image-sized inputs hold tens of thousands of rows.
///
/// # Examples
///
/// ```
/// use tumorscope::metrics::inertia;
/// use tumorscope::primitives::Matrix;
///
/// let data = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     1.0, 0.0,
///     0.0, 1.0,
///     1.0, 1.0,
/// ]).expect("Matrix dimensions and data length are valid");
/// let centroids = Matrix::from_vec(1, 2, vec![0.5, 0.5]).expect("Matrix dimensions and data length are valid");
/// let labels = vec![0, 0, 0, 0];
/// let score = inertia(&data, &centroids, &labels);
/// assert!((score - 2.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn inertia(data: &Matrix<f32>, centroids: &Matrix<f32>, labels: &[usize]) -> f64 {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| squared_distance(data.row_slice(i), centroids.row_slice(label)))
        .sum()
}

/// Squared Euclidean distance in `f64`.
pub(crate) fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum()
}

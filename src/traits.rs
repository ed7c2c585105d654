//! Core traits for estimators.
//!
//! These traits define the API contracts the pipeline programs against.

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for unsupervised learning models.
///
/// # Examples
///
/// ```
/// use tumorscope::prelude::*;
///
/// // Two clear clusters of intensities
/// let data = Matrix::column_vector(vec![0.0, 0.1, 0.2, 10.0, 10.1, 10.2]);
///
/// let mut kmeans = KMeans::new(2).with_random_state(42);
/// kmeans.fit(&data).unwrap();
/// let labels = kmeans.predict(&data).unwrap();
/// assert_eq!(labels.len(), 6);
/// ```
pub trait UnsupervisedEstimator {
    /// The type of labels/clusters produced.
    type Labels;

    /// Fits the model to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (empty data, invalid parameters, etc.).
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// Predicts cluster assignments or transforms data.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or `x` has the wrong width.
    fn predict(&self, x: &Matrix<f32>) -> Result<Self::Labels>;
}

/// Trait for binary probabilistic classifiers.
///
/// Labels are `0` (negative) and `1` (positive); probabilities are
/// P(label = 1).
pub trait BinaryClassifier {
    /// Fits the classifier.
    ///
    /// # Errors
    ///
    /// Returns an error on shape mismatch, empty input or labels outside {0, 1}.
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()>;

    /// Positive-class probability per row.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the width is wrong.
    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<f32>>;

    /// Binarises `predict_proba` at `threshold` (`p >= threshold` is positive).
    ///
    /// # Errors
    ///
    /// Propagates errors from `predict_proba`.
    fn predict(&self, x: &Matrix<f32>, threshold: f32) -> Result<Vec<usize>> {
        Ok(binarize(&self.predict_proba(x)?, threshold))
    }
}

/// Maps probabilities to hard labels at `threshold`.
#[must_use]
pub fn binarize(probabilities: &[f32], threshold: f32) -> Vec<usize> {
    probabilities
        .iter()
        .map(|&p| usize::from(p >= threshold))
        .collect()
}

//! Gradient Boosting Classifier implementation.
//!
//! Binary log-loss boosting with regression trees as weak learners.

use super::{FeatureOrder, RegressionTree};
use crate::error::{Result, TumorscopeError};
use crate::primitives::Matrix;
use crate::traits::BinaryClassifier;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Gradient Boosting Classifier.
///
/// # Algorithm
///
/// 1. Initialize with constant prediction (log-odds of the positive rate)
/// 2. For each boosting iteration:
///    - Compute pseudo-residuals `y - p`
///    - Fit a regression tree to the residuals (optionally on a row subsample)
///    - Set each leaf to the Newton step `Σr / Σp(1-p)`
///    - Update raw scores with `learning_rate * leaf`
/// 3. Final probability = sigmoid(raw score)
///
/// # Examples
///
/// ```
/// use tumorscope::prelude::*;
///
/// let x = Matrix::from_vec(8, 2, vec![
///     0.0, 0.0, 0.1, 0.1, 0.2, 0.2, 0.3, 0.3,
///     10.0, 10.0, 10.1, 10.1, 10.2, 10.2, 10.3, 10.3,
/// ]).unwrap();
/// let y = vec![0, 0, 0, 0, 1, 1, 1, 1];
///
/// let mut gbm = GradientBoostingClassifier::new().with_n_estimators(20);
/// gbm.fit(&x, &y).unwrap();
/// assert_eq!(gbm.predict(&x, 0.5).unwrap(), y);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    /// Number of boosting iterations (trees)
    n_estimators: usize,
    /// Learning rate (shrinkage parameter)
    learning_rate: f32,
    /// Maximum depth of each tree
    max_depth: usize,
    /// Minimum samples per leaf
    min_samples_leaf: usize,
    /// Fraction of rows drawn (without replacement) per tree
    subsample: f32,
    /// Seed for row subsampling
    random_state: Option<u64>,
    /// Initial prediction (log-odds for class 1)
    init_prediction: f32,
    /// Ensemble of regression trees
    estimators: Vec<RegressionTree>,
    /// Training width
    n_features: usize,
}

impl GradientBoostingClassifier {
    /// Creates a new Gradient Boosting Classifier with default parameters.
    ///
    /// # Default Parameters
    ///
    /// - `n_estimators`: 100
    /// - `learning_rate`: 0.05
    /// - `max_depth`: 3
    /// - `min_samples_leaf`: 1
    /// - `subsample`: 1.0
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.05,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            random_state: None,
            init_prediction: 0.0,
            estimators: Vec::new(),
            n_features: 0,
        }
    }

    /// Sets the number of boosting iterations (trees).
    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the learning rate (shrinkage parameter).
    ///
    /// Lower values require more trees but often lead to better generalization.
    /// Typical values: 0.01 - 0.3
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the maximum depth of each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the minimum number of samples at each leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Sets the per-tree row sampling fraction in (0, 1].
    #[must_use]
    pub fn with_subsample(mut self, subsample: f32) -> Self {
        self.subsample = subsample;
        self
    }

    /// Sets the seed used for row subsampling.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sigmoid function: σ(x) = 1 / (1 + e^(-x))
    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    fn validate(&self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        if x.n_rows() != y.len() {
            return Err(TumorscopeError::dimension_mismatch(
                "labels",
                x.n_rows(),
                y.len(),
            ));
        }
        if x.n_rows() == 0 {
            return Err(TumorscopeError::empty("cannot fit with 0 samples"));
        }
        if let Some(&bad) = y.iter().find(|&&label| label > 1) {
            return Err(TumorscopeError::invalid_hyperparameter(
                "label",
                bad,
                "0 or 1",
            ));
        }
        if self.n_estimators == 0 {
            return Err(TumorscopeError::invalid_hyperparameter(
                "n_estimators",
                self.n_estimators,
                ">= 1",
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TumorscopeError::invalid_hyperparameter(
                "learning_rate",
                self.learning_rate,
                "> 0",
            ));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(TumorscopeError::invalid_hyperparameter(
                "subsample",
                self.subsample,
                "in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Trains on `x`, `y` while tracking misclassification error on a
    /// held-out set after every round.
    ///
    /// Returns one validation error per boosting round; entry `i` is the
    /// error of the ensemble holding the first `i + 1` trees.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid hyperparameters, shape mismatches, labels
    /// outside {0, 1} or an empty validation set.
    pub fn fit_with_validation(
        &mut self,
        x: &Matrix<f32>,
        y: &[usize],
        x_val: &Matrix<f32>,
        y_val: &[usize],
    ) -> Result<Vec<f32>> {
        if y_val.is_empty() {
            return Err(TumorscopeError::empty("validation set"));
        }
        self.validate(x_val, y_val)?;
        if x_val.n_cols() != x.n_cols() {
            return Err(TumorscopeError::dimension_mismatch(
                "validation n_features",
                x.n_cols(),
                x_val.n_cols(),
            ));
        }

        // Accumulated in the same order as `decision_function` so the last
        // entry matches the fitted ensemble exactly.
        let mut raw_val: Option<Vec<f32>> = None;
        let mut errors = Vec::with_capacity(self.n_estimators);
        self.boost(x, y, |gbm, tree| {
            let raw_val = raw_val.get_or_insert_with(|| vec![gbm.init_prediction; x_val.n_rows()]);
            for (i, raw) in raw_val.iter_mut().enumerate() {
                *raw += gbm.learning_rate * tree.predict_row(x_val.row_slice(i));
            }
            let wrong = raw_val
                .iter()
                .zip(y_val)
                .filter(|(&raw, &label)| usize::from(Self::sigmoid(raw) >= 0.5) != label)
                .count();
            errors.push(wrong as f32 / y_val.len() as f32);
        })?;

        Ok(errors)
    }

    /// Runs the boosting loop, calling `on_round` after each tree is added.
    fn boost<F>(&mut self, x: &Matrix<f32>, y: &[usize], mut on_round: F) -> Result<()>
    where
        F: FnMut(&Self, &RegressionTree),
    {
        self.validate(x, y)?;

        let n_samples = x.n_rows();
        let y_float: Vec<f32> = y.iter().map(|&label| label as f32).collect();

        let positive_count = y.iter().filter(|&&label| label == 1).count();
        let p = positive_count as f32 / n_samples as f32;
        self.init_prediction = if p > 0.0 && p < 1.0 {
            (p / (1.0 - p)).ln()
        } else if p >= 1.0 {
            5.0
        } else {
            -5.0
        };

        let order = FeatureOrder::new(x);
        let mut rng = StdRng::seed_from_u64(self.random_state.unwrap_or(0));
        let sample_size = ((n_samples as f32 * self.subsample).round() as usize).clamp(1, n_samples);
        let all_rows: Vec<usize> = (0..n_samples).collect();

        let mut raw_predictions = vec![self.init_prediction; n_samples];
        self.estimators = Vec::with_capacity(self.n_estimators);
        self.n_features = x.n_cols();

        for round in 0..self.n_estimators {
            let probabilities: Vec<f32> =
                raw_predictions.iter().map(|&r| Self::sigmoid(r)).collect();
            let residuals: Vec<f32> = y_float
                .iter()
                .zip(&probabilities)
                .map(|(&yi, &pi)| yi - pi)
                .collect();

            let rows = if sample_size < n_samples {
                let mut rows = rand::seq::index::sample(&mut rng, n_samples, sample_size).into_vec();
                rows.sort_unstable();
                rows
            } else {
                all_rows.clone()
            };

            let newton_step = |leaf_rows: &[usize]| -> f32 {
                let (num, den) = leaf_rows.iter().fold((0.0_f64, 0.0_f64), |(n, d), &i| {
                    let pi = f64::from(probabilities[i]);
                    (n + f64::from(residuals[i]), d + pi * (1.0 - pi))
                });
                if den.abs() < 1e-12 {
                    0.0
                } else {
                    (num / den) as f32
                }
            };

            let mut tree = RegressionTree::new()
                .with_max_depth(self.max_depth)
                .with_min_samples_leaf(self.min_samples_leaf);
            tree.fit_rows(x, &order, &residuals, &rows, &newton_step)?;

            for (i, raw) in raw_predictions.iter_mut().enumerate() {
                *raw += self.learning_rate * tree.predict_row(x.row_slice(i));
            }

            on_round(self, &tree);
            self.estimators.push(tree);

            if round % 500 == 0 {
                tracing::debug!(round, "boosting");
            }
        }

        Ok(())
    }

    /// Raw log-odds score for each row.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the width differs.
    pub fn decision_function(&self, x: &Matrix<f32>) -> Result<Vec<f32>> {
        if self.estimators.is_empty() {
            return Err(TumorscopeError::NotFitted {
                model: "GradientBoostingClassifier",
            });
        }
        if x.n_cols() != self.n_features {
            return Err(TumorscopeError::dimension_mismatch(
                "n_features",
                self.n_features,
                x.n_cols(),
            ));
        }

        Ok((0..x.n_rows())
            .map(|i| {
                let row = x.row_slice(i);
                self.estimators
                    .iter()
                    .fold(self.init_prediction, |acc, tree| {
                        acc + self.learning_rate * tree.predict_row(row)
                    })
            })
            .collect())
    }

    /// Positive-class probabilities after each boosting round.
    ///
    /// Entry `m` holds the predictions of the first `m + 1` trees.
    ///
    /// # Errors
    ///
    /// Same as [`Self::decision_function`].
    pub fn staged_predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        // Validates fitted state and width.
        self.decision_function(x)?;

        let mut raw = vec![self.init_prediction; x.n_rows()];
        let mut stages = Vec::with_capacity(self.estimators.len());
        for tree in &self.estimators {
            for (i, r) in raw.iter_mut().enumerate() {
                *r += self.learning_rate * tree.predict_row(x.row_slice(i));
            }
            stages.push(raw.iter().map(|&r| Self::sigmoid(r)).collect());
        }
        Ok(stages)
    }

    /// Returns the number of estimators (trees) in the ensemble.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.estimators.len()
    }

    /// Returns the number of configured estimators.
    #[must_use]
    pub fn configured_n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Returns the max depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns a reference to the estimators.
    #[must_use]
    pub fn estimators(&self) -> &[RegressionTree] {
        &self.estimators
    }
}

impl BinaryClassifier for GradientBoostingClassifier {
    /// Trains the Gradient Boosting Classifier.
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        self.boost(x, y, |_, _| {})
    }

    /// Probability of the positive class per row.
    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<f32>> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(Self::sigmoid)
            .collect())
    }
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

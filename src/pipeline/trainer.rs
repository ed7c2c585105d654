//! Two-step classifier training.
//!
//! 1. Fit on train with the full round budget while tracking validation
//!    error after every round; the round with the lowest error wins.
//! 2. Refit from scratch on train + validation with exactly that many
//!    rounds.

use super::config::BoostingConfig;
use super::evaluation::{ThresholdPolicy, ThresholdSelection};
use crate::error::{Result, TumorscopeError};
use crate::primitives::Matrix;
use crate::traits::BinaryClassifier;
use crate::tree::GradientBoostingClassifier;

/// Output of [`train`].
#[derive(Debug, Clone)]
pub struct TrainedModel {
    /// Classifier refit on train + validation.
    pub classifier: GradientBoostingClassifier,
    /// Number of boosting rounds selected on validation.
    pub best_rounds: usize,
    /// Validation error after each round of the monitored fit.
    pub validation_errors: Vec<f32>,
    /// Decision threshold and, when tuned, its sweep.
    pub threshold: ThresholdSelection,
}

impl TrainedModel {
    /// Tumor probabilities for `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has the wrong width.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<f32>> {
        self.classifier.predict_proba(x)
    }
}

/// 1-based round with the lowest error, earliest on ties.
#[must_use]
pub fn select_rounds(validation_errors: &[f32]) -> Option<usize> {
    validation_errors
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &e)| match best {
            Some((_, b)) if b <= e => best,
            _ => Some((i, e)),
        })
        .map(|(i, _)| i + 1)
}

/// Runs both training steps.
///
/// # Errors
///
/// Propagates classifier errors (shape mismatches, single-row data,
/// invalid hyperparameters).
pub fn train(
    (x_train, y_train): (&Matrix<f32>, &[usize]),
    (x_val, y_val): (&Matrix<f32>, &[usize]),
    boosting: &BoostingConfig,
    threshold: ThresholdPolicy,
    seed: u64,
) -> Result<TrainedModel> {
    let mut monitored = boosting.classifier(boosting.max_rounds, seed);
    let validation_errors = monitored.fit_with_validation(x_train, y_train, x_val, y_val)?;
    let best_rounds = select_rounds(&validation_errors)
        .ok_or_else(|| TumorscopeError::empty("no boosting rounds were run"))?;
    tracing::info!(
        best_rounds,
        val_error = validation_errors[best_rounds - 1],
        "selected boosting rounds"
    );

    let threshold = match threshold {
        ThresholdPolicy::Fixed(_) => threshold.select(&[], &[]),
        ThresholdPolicy::TuneOnValidation => {
            let stages = monitored.staged_predict_proba(x_val)?;
            threshold.select(&stages[best_rounds - 1], y_val)
        }
    };
    tracing::info!(threshold = threshold.threshold, "decision threshold");

    let x_full = x_train
        .vstack(x_val)
        .map_err(|e| TumorscopeError::Other(e.to_string()))?;
    let y_full: Vec<usize> = y_train.iter().chain(y_val).copied().collect();

    let mut classifier = boosting.classifier(best_rounds, seed);
    classifier.fit(&x_full, &y_full)?;
    tracing::info!(rows = y_full.len(), rounds = best_rounds, "refit on train+val");

    Ok(TrainedModel {
        classifier,
        best_rounds,
        validation_errors,
        threshold,
    })
}

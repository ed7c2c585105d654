//! Decision threshold selection and per-split metrics.

use crate::error::{Result, TumorscopeError};
use crate::metrics::{roc_curve, BinaryConfusion, RocCurve};
use crate::traits::binarize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the probability cut-off is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Use this threshold as-is.
    Fixed(f32),
    /// Sweep 0.00..=1.00 on validation probabilities and keep the most
    /// accurate threshold (lowest on ties).
    TuneOnValidation,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Fixed(0.5)
    }
}

/// Accuracy at one candidate threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPoint {
    /// Candidate cut-off.
    pub threshold: f32,
    /// Validation accuracy at that cut-off.
    pub accuracy: f64,
}

/// Outcome of applying a [`ThresholdPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSelection {
    /// Chosen cut-off.
    pub threshold: f32,
    /// Sweep curve when the threshold was tuned.
    pub sweep: Option<Vec<ThresholdPoint>>,
}

impl ThresholdPolicy {
    /// Resolve the threshold, sweeping `val_proba` when tuning.
    #[must_use]
    pub fn select(self, val_proba: &[f32], val_labels: &[usize]) -> ThresholdSelection {
        match self {
            ThresholdPolicy::Fixed(threshold) => ThresholdSelection {
                threshold,
                sweep: None,
            },
            ThresholdPolicy::TuneOnValidation => {
                let sweep = threshold_sweep(val_proba, val_labels);
                let threshold = best_threshold(&sweep).map_or(0.5, |p| p.threshold);
                ThresholdSelection {
                    threshold,
                    sweep: Some(sweep),
                }
            }
        }
    }
}

/// Accuracy at thresholds 0.00, 0.01, ..., 1.00.
#[must_use]
pub fn threshold_sweep(proba: &[f32], labels: &[usize]) -> Vec<ThresholdPoint> {
    (0..=100)
        .map(|step| {
            let threshold = step as f32 / 100.0;
            let cm = BinaryConfusion::from_predictions(&binarize(proba, threshold), labels);
            ThresholdPoint {
                threshold,
                accuracy: cm.accuracy(),
            }
        })
        .collect()
}

/// Earliest point with the highest accuracy.
#[must_use]
pub fn best_threshold(sweep: &[ThresholdPoint]) -> Option<ThresholdPoint> {
    sweep.iter().copied().fold(None, |best, p| match best {
        Some(b) if b.accuracy >= p.accuracy => Some(b),
        _ => Some(p),
    })
}

/// Metrics of one evaluated split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitMetrics {
    /// Display name, e.g. `train+val`.
    pub name: String,
    /// Threshold the predictions were made at.
    pub threshold: f32,
    /// Outcome counts.
    pub confusion: BinaryConfusion,
    /// (TP + TN) / N.
    pub accuracy: f64,
    /// TP / (TP + FN).
    pub sensitivity: f64,
    /// TN / (TN + FP).
    pub specificity: f64,
    /// Area under the ROC curve; absent when only one class is present.
    pub auc: Option<f64>,
    /// ROC operating points; absent with `auc`.
    pub roc: Option<RocCurve>,
}

/// Binarise `proba` at `threshold` and score against `labels`.
///
/// # Errors
///
/// Returns an error if the lengths differ or the input is empty.
pub fn evaluate_split(
    name: &str,
    proba: &[f32],
    labels: &[usize],
    threshold: f32,
) -> Result<SplitMetrics> {
    if proba.len() != labels.len() {
        return Err(TumorscopeError::dimension_mismatch(
            "labels",
            proba.len(),
            labels.len(),
        ));
    }
    if proba.is_empty() {
        return Err(TumorscopeError::empty(format!("nothing to evaluate in {name}")));
    }

    let roc = match roc_curve(proba, labels) {
        Ok(curve) => Some(curve),
        Err(e) => {
            tracing::warn!(split = name, error = %e, "ROC undefined");
            None
        }
    };

    let confusion = BinaryConfusion::from_predictions(&binarize(proba, threshold), labels);
    Ok(SplitMetrics {
        name: name.to_string(),
        threshold,
        confusion,
        accuracy: confusion.accuracy(),
        sensitivity: confusion.sensitivity(),
        specificity: confusion.specificity(),
        auc: roc.as_ref().map(RocCurve::auc),
        roc,
    })
}

impl fmt::Display for SplitMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cm = &self.confusion;
        writeln!(f, "== {} (threshold {:.2}) ==", self.name, self.threshold)?;
        writeln!(f, "                 pred healthy  pred tumor")?;
        writeln!(f, "  actual healthy {:>12}  {:>10}", cm.tn, cm.fp)?;
        writeln!(f, "  actual tumor   {:>12}  {:>10}", cm.fn_, cm.tp)?;
        match self.auc {
            Some(auc) => writeln!(f, "  AUC         {auc:.4}")?,
            None => writeln!(f, "  AUC         n/a")?,
        }
        writeln!(f, "  accuracy    {:.4}", self.accuracy)?;
        writeln!(f, "  sensitivity {:.4}", self.sensitivity)?;
        write!(f, "  specificity {:.4}", self.specificity)
    }
}

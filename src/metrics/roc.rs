//! Receiver operating characteristic curve and area under it.

use crate::error::{Result, TumorscopeError};
use serde::Serialize;

/// One operating point of a ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    /// False positive rate at this threshold.
    pub fpr: f64,
    /// True positive rate at this threshold.
    pub tpr: f64,
    /// Scores `>= threshold` are predicted positive. The first point uses +∞.
    pub threshold: f32,
}

/// ROC curve ordered by decreasing threshold, from (0, 0) to (1, 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    /// Operating points, one per distinct score plus the origin.
    pub points: Vec<RocPoint>,
}

impl RocCurve {
    /// Area under the curve by the trapezoidal rule.
    #[must_use]
    pub fn auc(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
            .sum()
    }
}

/// Computes the ROC curve of `scores` against binary `labels`.
///
/// Samples sharing a score enter the curve together, so ties produce a
/// diagonal segment rather than an order-dependent staircase.
///
/// # Errors
///
/// Returns an error if lengths differ, input is empty, or only one class
/// is present (the curve is undefined).
///
/// # Examples
///
/// ```
/// use tumorscope::metrics::roc_curve;
///
/// let scores = [0.1, 0.4, 0.35, 0.8];
/// let labels = [0, 0, 1, 1];
/// let roc = roc_curve(&scores, &labels).unwrap();
/// assert!((roc.auc() - 0.75).abs() < 1e-9);
/// ```
pub fn roc_curve(scores: &[f32], labels: &[usize]) -> Result<RocCurve> {
    if scores.len() != labels.len() {
        return Err(TumorscopeError::dimension_mismatch(
            "labels",
            scores.len(),
            labels.len(),
        ));
    }
    if scores.is_empty() {
        return Err(TumorscopeError::empty("ROC curve needs at least one sample"));
    }

    let n_pos = labels.iter().filter(|&&l| l != 0).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(TumorscopeError::empty(
            "ROC curve needs both positive and negative samples",
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut points = vec![RocPoint {
        fpr: 0.0,
        tpr: 0.0,
        threshold: f32::INFINITY,
    }];
    let (mut tp, mut fp) = (0usize, 0usize);

    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if labels[order[i]] != 0 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            fpr: fp as f64 / n_neg as f64,
            tpr: tp as f64 / n_pos as f64,
            threshold,
        });
    }

    Ok(RocCurve { points })
}

/// Area under the ROC curve of `scores` against `labels`.
///
/// # Errors
///
/// Same conditions as [`roc_curve`].
pub fn roc_auc(scores: &[f32], labels: &[usize]) -> Result<f64> {
    Ok(roc_curve(scores, labels)?.auc())
}

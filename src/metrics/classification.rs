//! Classification metrics for evaluating classifier performance.
//!
//! Binary confusion counts and the rates derived from them, used for
//! tumor / non-tumor evaluation.

use serde::{Deserialize, Serialize};

/// 2×2 confusion counts for a binary problem where `1` is the positive
/// (tumor) class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BinaryConfusion {
    /// Positives predicted positive.
    pub tp: usize,
    /// Negatives predicted positive.
    pub fp: usize,
    /// Positives predicted negative.
    pub fn_: usize,
    /// Negatives predicted negative.
    pub tn: usize,
}

impl BinaryConfusion {
    /// Counts outcomes. Any non-zero label is treated as positive.
    ///
    /// # Panics
    ///
    /// Panics if vectors have different lengths.
    #[must_use]
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize]) -> Self {
        assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");

        let mut cm = Self::default();
        for (&pred, &truth) in y_pred.iter().zip(y_true) {
            match (truth != 0, pred != 0) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (false, false) => cm.tn += 1,
            }
        }
        cm
    }

    /// Total number of samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    /// (TP + TN) / total; 0.0 when empty.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// TP / (TP + FN), the true positive rate.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// TN / (TN + FP), the true negative rate.
    #[must_use]
    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

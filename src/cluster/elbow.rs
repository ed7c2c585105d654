//! Elbow method for choosing the number of clusters.
//!
//! The curve is the mean k-means inertia across a set of samples for each
//! candidate k. Picking the elbow is a policy: [`kneedle`] is one
//! automatic rule, a fixed k is the other.

use super::KMeans;
use crate::error::{Result, TumorscopeError};
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Mean within-cluster sum of squares at one k.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElbowPoint {
    /// Number of clusters.
    pub k: usize,
    /// Inertia averaged over all samples.
    pub mean_inertia: f64,
}

/// Computes the elbow curve over `k_values`.
///
/// Each sample (e.g. the intensity column of one image) is clustered
/// independently with the same seed and restart count.
///
/// # Errors
///
/// Returns an error if `samples` or `k_values` is empty, or if any
/// clustering fails (e.g. an image with fewer distinct values than k).
pub fn elbow_curve(
    samples: &[Matrix<f32>],
    k_values: RangeInclusive<usize>,
    seed: u64,
    n_init: usize,
) -> Result<Vec<ElbowPoint>> {
    if samples.is_empty() {
        return Err(TumorscopeError::empty("elbow curve needs at least one sample"));
    }
    if k_values.is_empty() {
        return Err(TumorscopeError::invalid_hyperparameter(
            "k_values",
            format!("{}..={}", k_values.start(), k_values.end()),
            "non-empty range",
        ));
    }

    k_values
        .map(|k| {
            let mut total = 0.0;
            for sample in samples {
                let mut kmeans = KMeans::new(k).with_n_init(n_init).with_random_state(seed);
                kmeans.fit(sample)?;
                total += kmeans.inertia();
            }
            tracing::debug!(k, mean_inertia = total / samples.len() as f64, "elbow point");
            Ok(ElbowPoint {
                k,
                mean_inertia: total / samples.len() as f64,
            })
        })
        .collect()
}

/// Picks the knee of a decreasing elbow curve.
///
/// Both axes are normalised to [0, 1]; the knee is the point furthest below
/// the chord joining the first and last points. Returns `None` for curves
/// with fewer than three points or no drop at all.
///
/// # Examples
///
/// ```
/// use tumorscope::cluster::{kneedle, ElbowPoint};
///
/// let curve: Vec<ElbowPoint> = [100.0, 30.0, 10.0, 8.0, 7.0, 6.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &mean_inertia)| ElbowPoint { k: i + 1, mean_inertia })
///     .collect();
/// assert_eq!(kneedle(&curve), Some(3));
/// ```
#[must_use]
pub fn kneedle(curve: &[ElbowPoint]) -> Option<usize> {
    if curve.len() < 3 {
        return None;
    }

    let first = curve.first()?;
    let last = curve.last()?;
    let k_span = (last.k as f64) - (first.k as f64);
    let (y_min, y_max) = curve
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.mean_inertia), hi.max(p.mean_inertia))
        });
    if k_span <= 0.0 || y_max - y_min <= 0.0 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for p in curve {
        let x = (p.k as f64 - first.k as f64) / k_span;
        let y = (p.mean_inertia - y_min) / (y_max - y_min);
        let gap = (1.0 - x) - y;
        if best.map_or(true, |(_, g)| gap > g) {
            best = Some((p.k, gap));
        }
    }

    best.filter(|&(_, gap)| gap > 0.0).map(|(k, _)| k)
}

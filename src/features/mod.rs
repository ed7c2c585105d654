//! Image → feature vector transformation.
//!
//! A greyscale scan is reduced to `4k` numbers by clustering its pixel
//! intensities: size, mean intensity, and mean column/row position of each
//! cluster, with clusters ordered from darkest to brightest so that the
//! columns mean the same thing for every image.

mod extract;
mod table;

pub use extract::{
    extract_features, feature_names, render_cluster_map, ClusterFeatures, ClusterStats,
    FeatureConfig,
};
pub use table::{FeatureRow, FeatureTable, FeatureTableBuilder};

use crate::cluster::{elbow_curve, kneedle, ElbowPoint};
use crate::error::{Result, TumorscopeError};
use crate::imaging::intensities;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// How the number of intensity clusters is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterCountPolicy {
    /// Use this k regardless of the elbow curve.
    Fixed(usize),
    /// Pick the knee of the elbow curve with [`kneedle`].
    Elbow,
}

impl Default for ClusterCountPolicy {
    fn default() -> Self {
        ClusterCountPolicy::Fixed(3)
    }
}

impl ClusterCountPolicy {
    /// Resolves the policy against a computed curve.
    ///
    /// # Errors
    ///
    /// `Elbow` fails when the curve has no knee (fewer than three points or
    /// flat).
    pub fn resolve(self, curve: Option<&[ElbowPoint]>) -> Result<usize> {
        match self {
            ClusterCountPolicy::Fixed(k) => Ok(k),
            ClusterCountPolicy::Elbow => curve
                .and_then(kneedle)
                .ok_or_else(|| TumorscopeError::Config("elbow curve has no knee".to_string())),
        }
    }
}

/// Elbow curve for k in `1..=max_k`, averaged over `images`.
///
/// # Errors
///
/// Fails if `images` is empty, `max_k` is zero, or an image has fewer
/// distinct grey levels than some k in the range.
pub fn image_elbow_curve(
    images: &[GrayImage],
    max_k: usize,
    seed: u64,
    n_init: usize,
) -> Result<Vec<ElbowPoint>> {
    let samples: Vec<_> = images.iter().map(intensities).collect();
    elbow_curve(&samples, 1..=max_k, seed, n_init)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_fixed_policy_ignores_curve() {
        assert_eq!(ClusterCountPolicy::default().resolve(None).unwrap(), 3);
    }

    #[test]
    fn test_elbow_policy_needs_knee() {
        assert!(ClusterCountPolicy::Elbow.resolve(None).is_err());
        let flat: Vec<ElbowPoint> = (1..=4)
            .map(|k| ElbowPoint {
                k,
                mean_inertia: 5.0,
            })
            .collect();
        assert!(ClusterCountPolicy::Elbow.resolve(Some(&flat)).is_err());
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&ClusterCountPolicy::Fixed(4)).unwrap();
        assert_eq!(json, r#"{"fixed":4}"#);
        let back: ClusterCountPolicy = serde_json::from_str(r#""elbow""#).unwrap();
        assert_eq!(back, ClusterCountPolicy::Elbow);
    }

    #[test]
    fn test_image_elbow_finds_three_levels() {
        let images: Vec<GrayImage> = (0..3)
            .map(|shift| {
                GrayImage::from_fn(30, 10, |x, y| {
                    let band = [20u8, 120, 220][((x + shift) % 30 / 10) as usize];
                    Luma([band + ((x * 5 + y * 3) % 6) as u8])
                })
            })
            .collect();

        let curve = image_elbow_curve(&images, 8, 42, 5).unwrap();
        assert_eq!(curve.len(), 8);
        assert!(curve[2].mean_inertia < curve[1].mean_inertia);
        assert_eq!(ClusterCountPolicy::Elbow.resolve(Some(&curve)).unwrap(), 3);
    }
}

//! Per-image intensity clustering.

use crate::cluster::KMeans;
use crate::error::{Result, TumorscopeError};
use crate::imaging::intensities;
use crate::traits::UnsupervisedEstimator;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Settings for [`extract_features`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Number of intensity clusters.
    pub n_clusters: usize,
    /// k-means++ restarts per image.
    pub n_init: usize,
    /// Seed shared by every image.
    pub seed: u64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            n_init: 50,
            seed: 42,
        }
    }
}

/// Statistics of one intensity cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    /// Number of pixels.
    pub size: usize,
    /// Mean grey level in 0..=255.
    pub intensity: f64,
    /// Mean column index.
    pub x: f64,
    /// Mean row index.
    pub y: f64,
}

/// Clusters of one image, ordered by ascending mean intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFeatures {
    clusters: Vec<ClusterStats>,
    assignment: Vec<usize>,
    width: u32,
    height: u32,
}

impl ClusterFeatures {
    /// Cluster statistics, darkest first.
    #[must_use]
    pub fn clusters(&self) -> &[ClusterStats] {
        &self.clusters
    }

    /// Row-major ordered cluster index of every pixel.
    #[must_use]
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Image dimensions `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Flat feature vector: sizes, then intensities, then x, then y.
    #[must_use]
    pub fn to_vector(&self) -> Vec<f32> {
        let c = &self.clusters;
        c.iter()
            .map(|s| s.size as f32)
            .chain(c.iter().map(|s| s.intensity as f32))
            .chain(c.iter().map(|s| s.x as f32))
            .chain(c.iter().map(|s| s.y as f32))
            .collect()
    }
}

/// Column names matching [`ClusterFeatures::to_vector`] for `k` clusters.
#[must_use]
pub fn feature_names(k: usize) -> Vec<String> {
    ["size", "intensity", "x", "y"]
        .iter()
        .flat_map(|stat| (0..k).map(move |i| format!("{stat}_{i}")))
        .collect()
}

/// Cluster the pixel intensities of `image` and summarise each cluster.
///
/// Pixels are flattened row-major into a one-dimensional sample set and
/// clustered with k-means. Clusters are then relabelled so that index 0 is
/// the darkest, and every statistic follows that order.
///
/// # Errors
///
/// Returns `DegenerateClustering` if the image has fewer distinct grey
/// levels than clusters or if a cluster ends up with no pixels.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use tumorscope::features::{extract_features, FeatureConfig};
///
/// // Left half dark, right half bright.
/// let img = GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 10 } else { 200 }]));
/// let config = FeatureConfig { n_clusters: 2, n_init: 5, seed: 1 };
/// let features = extract_features(&img, &config).unwrap();
///
/// let dark = features.clusters()[0];
/// assert_eq!(dark.size, 8);
/// assert_eq!(dark.intensity, 10.0);
/// assert_eq!(dark.x, 0.5);
/// ```
pub fn extract_features(image: &GrayImage, config: &FeatureConfig) -> Result<ClusterFeatures> {
    let k = config.n_clusters;
    let (width, height) = image.dimensions();

    let mut kmeans = KMeans::new(k)
        .with_n_init(config.n_init)
        .with_random_state(config.seed);
    kmeans.fit(&intensities(image))?;
    let labels = kmeans
        .labels()
        .ok_or(TumorscopeError::NotFitted { model: "KMeans" })?;

    let mut sizes = vec![0usize; k];
    let mut sum_v = vec![0.0_f64; k];
    let mut sum_x = vec![0.0_f64; k];
    let mut sum_y = vec![0.0_f64; k];
    for (i, (&label, &value)) in labels.iter().zip(image.as_raw()).enumerate() {
        let x = i % width as usize;
        let y = i / width as usize;
        sizes[label] += 1;
        sum_v[label] += f64::from(value);
        sum_x[label] += x as f64;
        sum_y[label] += y as f64;
    }

    if let Some(empty) = sizes.iter().position(|&s| s == 0) {
        return Err(TumorscopeError::DegenerateClustering {
            k,
            reason: format!("cluster {empty} has no pixels"),
        });
    }

    let raw: Vec<ClusterStats> = (0..k)
        .map(|c| {
            let n = sizes[c] as f64;
            ClusterStats {
                size: sizes[c],
                intensity: sum_v[c] / n,
                x: sum_x[c] / n,
                y: sum_y[c] / n,
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| raw[a].intensity.total_cmp(&raw[b].intensity));
    let mut rank = vec![0usize; k];
    for (new, &old) in order.iter().enumerate() {
        rank[old] = new;
    }

    Ok(ClusterFeatures {
        clusters: order.iter().map(|&c| raw[c]).collect(),
        assignment: labels.iter().map(|&l| rank[l]).collect(),
        width,
        height,
    })
}

/// Paint every pixel with its cluster's mean intensity.
#[must_use]
pub fn render_cluster_map(features: &ClusterFeatures) -> GrayImage {
    let (width, height) = features.dimensions();
    let levels: Vec<u8> = features
        .clusters()
        .iter()
        .map(|c| c.intensity.round().clamp(0.0, 255.0) as u8)
        .collect();
    GrayImage::from_fn(width, height, |x, y| {
        let i = (y * width + x) as usize;
        Luma([levels[features.assignment()[i]]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(k: usize) -> FeatureConfig {
        FeatureConfig {
            n_clusters: k,
            n_init: 10,
            seed: 42,
        }
    }

    /// Top band dark, bottom band bright.
    fn two_bands() -> GrayImage {
        GrayImage::from_fn(4, 4, |_, y| Luma([if y < 2 { 20 } else { 220 }]))
    }

    /// Noisy three-level scan-like image.
    fn three_levels(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let base = match (x * 3) / w {
                0 => 30,
                1 => 120,
                _ => 230,
            };
            Luma([base + ((x * 7 + y * 13) % 9) as u8])
        })
    }

    #[test]
    fn test_two_band_image_separates_bands() {
        let f = extract_features(&two_bands(), &config(2)).unwrap();
        let [low, high] = [f.clusters()[0], f.clusters()[1]];

        assert_eq!(low.size, 8);
        assert_eq!(high.size, 8);
        assert!((low.intensity - 20.0).abs() < 1e-9);
        assert!((high.intensity - 220.0).abs() < 1e-9);
        assert!((low.y - 0.5).abs() < 1e-9);
        assert!((high.y - 2.5).abs() < 1e-9);
        assert!((low.x - 1.5).abs() < 1e-9);
        assert_eq!(&f.assignment()[..8], &[0; 8]);
        assert_eq!(&f.assignment()[8..], &[1; 8]);
    }

    #[test]
    fn test_sizes_sum_to_pixel_count() {
        let img = three_levels(24, 10);
        let f = extract_features(&img, &config(3)).unwrap();
        let total: usize = f.clusters().iter().map(|c| c.size).sum();
        assert_eq!(total, 240);
        assert_eq!(f.assignment().len(), 240);
    }

    #[test]
    fn test_intensities_ascending() {
        let f = extract_features(&three_levels(30, 12), &config(3)).unwrap();
        let levels: Vec<f64> = f.clusters().iter().map(|c| c.intensity).collect();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]), "{levels:?}");
    }

    #[test]
    fn test_vector_layout() {
        let f = extract_features(&three_levels(30, 12), &config(3)).unwrap();
        let v = f.to_vector();
        assert_eq!(v.len(), 12);
        let c = f.clusters();
        assert_eq!(v[0], c[0].size as f32);
        assert_eq!(v[4], c[1].intensity as f32);
        assert_eq!(v[8], c[2].x as f32);
        assert_eq!(v[11], c[2].y as f32);
        assert_eq!(feature_names(3)[4], "intensity_1");
        assert_eq!(feature_names(3).len(), 12);
    }

    #[test]
    fn test_deterministic() {
        let img = three_levels(20, 20);
        let a = extract_features(&img, &config(3)).unwrap();
        let b = extract_features(&img, &config(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_uniform_image_is_degenerate() {
        let img = GrayImage::from_pixel(5, 5, Luma([77]));
        assert!(matches!(
            extract_features(&img, &config(3)),
            Err(TumorscopeError::DegenerateClustering { k: 3, .. })
        ));
    }

    #[test]
    fn test_cluster_map_uses_mean_levels() {
        let f = extract_features(&two_bands(), &config(2)).unwrap();
        let map = render_cluster_map(&f);
        assert_eq!(map.dimensions(), (4, 4));
        assert_eq!(map.get_pixel(0, 0), &Luma([20]));
        assert_eq!(map.get_pixel(3, 3), &Luma([220]));
    }
}

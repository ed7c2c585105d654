//! K-Means clustering algorithm.
//!
//! Lloyd iterations from k-means++ seeds, restarted `n_init` times with the
//! lowest-inertia run kept. All randomness flows from one explicit seed.

use crate::error::{Result, TumorscopeError};
use crate::metrics::{inertia, squared_distance};
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// K-Means clustering algorithm.
///
/// # Algorithm
///
/// 1. Seed centroids with k-means++ (D² sampling)
/// 2. Assign each sample to nearest centroid
/// 3. Update centroids as mean of assigned samples
/// 4. Repeat until convergence or max iterations
/// 5. Repeat 1-4 `n_init` times, keep the run with the lowest inertia
///
/// # Examples
///
/// ```
/// use tumorscope::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 2.0,
///     1.5, 1.8,
///     5.0, 8.0,
///     8.0, 8.0,
///     1.0, 0.6,
///     9.0, 11.0,
/// ]).expect("Valid matrix dimensions and data length");
///
/// let mut kmeans = KMeans::new(2).with_random_state(7);
/// kmeans.fit(&data).expect("Fit succeeds with valid data");
///
/// let labels = kmeans.predict(&data).expect("fitted");
/// assert_eq!(labels.len(), 6);
/// ```
///
/// # Performance
///
/// - Time complexity: O(r·n·k·d·i) for r restarts, n samples, k clusters,
///   d features, i iterations
/// - Space complexity: O(n + k·d)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    /// Number of clusters.
    n_clusters: usize,
    /// Maximum iterations per run.
    max_iter: usize,
    /// Convergence tolerance on centroid movement.
    tol: f32,
    /// Number of k-means++ restarts.
    n_init: usize,
    /// Random seed for initialization.
    random_state: Option<u64>,
    /// Cluster centroids after fitting.
    centroids: Option<Matrix<f32>>,
    /// Labels for training data.
    labels: Option<Vec<usize>>,
    /// Sum of squared distances (inertia).
    inertia: f64,
    /// Number of iterations run by the kept restart.
    n_iter: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(8)
    }
}

/// Outcome of a single seeded Lloyd run.
struct Run {
    centroids: Matrix<f32>,
    labels: Vec<usize>,
    inertia: f64,
    n_iter: usize,
}

impl KMeans {
    /// Creates a new K-Means with the specified number of clusters.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            tol: 1e-4,
            n_init: 10,
            random_state: None,
            centroids: None,
            labels: None,
            inertia: 0.0,
            n_iter: 0,
        }
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Sets how many independently seeded runs to try.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Number of clusters requested.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Returns the cluster centroids, if fitted.
    #[must_use]
    pub fn centroids(&self) -> Option<&Matrix<f32>> {
        self.centroids.as_ref()
    }

    /// Returns the training labels, if fitted.
    #[must_use]
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// Returns the inertia (within-cluster sum of squares).
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Returns the number of iterations run.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.centroids.is_some()
    }

    fn validate(&self, x: &Matrix<f32>) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(TumorscopeError::invalid_hyperparameter(
                "n_clusters",
                self.n_clusters,
                ">= 1",
            ));
        }
        if self.n_init == 0 {
            return Err(TumorscopeError::invalid_hyperparameter(
                "n_init",
                self.n_init,
                ">= 1",
            ));
        }

        let n_samples = x.n_rows();
        if n_samples == 0 {
            return Err(TumorscopeError::empty("cannot fit k-means on zero samples"));
        }
        if n_samples < self.n_clusters {
            return Err(TumorscopeError::DegenerateClustering {
                k: self.n_clusters,
                reason: format!("only {n_samples} samples"),
            });
        }

        let distinct = count_distinct_rows(x);
        if distinct < self.n_clusters {
            return Err(TumorscopeError::DegenerateClustering {
                k: self.n_clusters,
                reason: format!("only {distinct} distinct values"),
            });
        }
        Ok(())
    }

    /// Picks initial centroids by k-means++ D² sampling.
    fn kmeans_plusplus_init(&self, x: &Matrix<f32>, rng: &mut StdRng) -> Matrix<f32> {
        let (n_samples, n_features) = x.shape();
        let mut centroids_data = Vec::with_capacity(self.n_clusters * n_features);

        let first_idx = rng.random_range(0..n_samples);
        centroids_data.extend_from_slice(x.row_slice(first_idx));

        let mut min_distances: Vec<f64> = (0..n_samples)
            .map(|i| squared_distance(x.row_slice(i), x.row_slice(first_idx)))
            .collect();

        for _ in 1..self.n_clusters {
            let total: f64 = min_distances.iter().sum();
            let target = rng.random::<f64>() * total;

            // Walk the cumulative mass; fall back to the last point with mass
            // when rounding leaves `target` past the end.
            let mut chosen = None;
            let mut cumulative = 0.0;
            for (i, &d) in min_distances.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                chosen = Some(i);
                cumulative += d;
                if cumulative > target {
                    break;
                }
            }
            let next_idx = chosen.unwrap_or(first_idx);
            let next = x.row_slice(next_idx);
            centroids_data.extend_from_slice(next);

            for (i, min_dist) in min_distances.iter_mut().enumerate() {
                let d = squared_distance(x.row_slice(i), next);
                if d < *min_dist {
                    *min_dist = d;
                }
            }
        }

        Matrix::from_vec(self.n_clusters, n_features, centroids_data)
            .expect("k-means++ produces n_clusters rows of n_features")
    }

    /// Assigns each sample to the nearest centroid (lowest index on ties).
    fn assign_labels(&self, x: &Matrix<f32>, centroids: &Matrix<f32>) -> Vec<usize> {
        (0..x.n_rows())
            .map(|i| nearest_centroid(x.row_slice(i), centroids))
            .collect()
    }

    /// Updates centroids as the mean of assigned samples.
    ///
    /// A cluster that lost all its samples keeps its previous centroid.
    fn update_centroids(
        &self,
        x: &Matrix<f32>,
        labels: &[usize],
        previous: &Matrix<f32>,
    ) -> Matrix<f32> {
        let n_features = x.n_cols();
        let mut sums = vec![0.0_f64; self.n_clusters * n_features];
        let mut counts = vec![0usize; self.n_clusters];

        for (i, &label) in labels.iter().enumerate() {
            counts[label] += 1;
            for (j, &v) in x.row_slice(i).iter().enumerate() {
                sums[label * n_features + j] += f64::from(v);
            }
        }

        let mut centroids = previous.clone();
        for k in 0..self.n_clusters {
            if counts[k] > 0 {
                for j in 0..n_features {
                    centroids.set(k, j, (sums[k * n_features + j] / counts[k] as f64) as f32);
                }
            }
        }
        centroids
    }

    /// Checks if centroids have converged.
    fn centroids_converged(&self, old: &Matrix<f32>, new: &Matrix<f32>) -> bool {
        let tol_sq = f64::from(self.tol) * f64::from(self.tol);
        (0..old.n_rows()).all(|k| squared_distance(old.row_slice(k), new.row_slice(k)) <= tol_sq)
    }

    fn run_once(&self, x: &Matrix<f32>, rng: &mut StdRng) -> Run {
        let mut centroids = self.kmeans_plusplus_init(x, rng);
        let mut n_iter = 0;

        for iter in 0..self.max_iter {
            let labels = self.assign_labels(x, &centroids);
            let new_centroids = self.update_centroids(x, &labels, &centroids);
            let converged = self.centroids_converged(&centroids, &new_centroids);
            centroids = new_centroids;
            n_iter = iter + 1;
            if converged {
                break;
            }
        }

        let labels = self.assign_labels(x, &centroids);
        let inertia = inertia(x, &centroids, &labels);
        Run {
            centroids,
            labels,
            inertia,
            n_iter,
        }
    }
}

impl UnsupervisedEstimator for KMeans {
    type Labels = Vec<usize>;

    /// Fits the K-Means model to data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is empty
    /// - `n_clusters` or `n_init` is zero
    /// - Data has fewer samples, or fewer distinct samples, than clusters
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        self.validate(x)?;

        let mut rng = StdRng::seed_from_u64(self.random_state.unwrap_or(DEFAULT_SEED));
        let mut best = self.run_once(x, &mut rng);
        for _ in 1..self.n_init {
            let run = self.run_once(x, &mut rng);
            if run.inertia < best.inertia {
                best = run;
            }
        }

        self.inertia = best.inertia;
        self.n_iter = best.n_iter;
        self.labels = Some(best.labels);
        self.centroids = Some(best.centroids);

        Ok(())
    }

    /// Predicts cluster labels for new data.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let centroids = self
            .centroids
            .as_ref()
            .ok_or(TumorscopeError::NotFitted { model: "KMeans" })?;
        if x.n_cols() != centroids.n_cols() {
            return Err(TumorscopeError::dimension_mismatch(
                "n_features",
                centroids.n_cols(),
                x.n_cols(),
            ));
        }

        Ok(self.assign_labels(x, centroids))
    }
}

fn nearest_centroid(point: &[f32], centroids: &Matrix<f32>) -> usize {
    let mut min_dist = f64::INFINITY;
    let mut min_cluster = 0;
    for k in 0..centroids.n_rows() {
        let dist = squared_distance(point, centroids.row_slice(k));
        if dist < min_dist {
            min_dist = dist;
            min_cluster = k;
        }
    }
    min_cluster
}

fn count_distinct_rows(x: &Matrix<f32>) -> usize {
    let mut rows: Vec<&[f32]> = (0..x.n_rows()).map(|i| x.row_slice(i)).collect();
    rows.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(p, q)| p.total_cmp(q))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.dedup();
    rows.len()
}

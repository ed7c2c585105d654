//! Clustering algorithms.
//!
//! K-Means with k-means++ seeding and restarts, plus the elbow method for
//! choosing k.

mod elbow;
mod kmeans;

pub use elbow::{elbow_curve, kneedle, ElbowPoint};
pub use kmeans::{KMeans, DEFAULT_SEED};

#[cfg(test)]
mod tests_kmeans_contract;

// =========================================================================
// FALSIFY-KM: KMeans invariants
//
//   KM-001 labels lie in [0, k)
//   KM-002 inertia is non-negative
//   KM-003 every sample sits with its nearest centroid
//   KM-004 k = 1 puts the centroid at the mean
//   KM-005 same data + seed + k gives identical output
//
// References:
//   - Lloyd (1982) "Least Squares Quantization in PCM"
//   - Arthur & Vassilvitskii (2007) "k-means++: The Advantages of Careful Seeding"
// =========================================================================

use super::*;
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use proptest::prelude::*;

/// FALSIFY-KM-001: Valid cluster indices
#[test]
fn falsify_km_001_valid_indices() {
    let data = Matrix::from_vec(
        6,
        2,
        vec![1.0, 2.0, 1.5, 1.8, 5.0, 8.0, 8.0, 8.0, 1.0, 0.6, 9.0, 11.0],
    )
    .expect("valid matrix");

    let k = 2;
    let mut km = KMeans::new(k).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    let labels = km.predict(&data).expect("fitted");
    for (i, &label) in labels.iter().enumerate() {
        assert!(
            label < k,
            "FALSIFIED KM-001: label[{i}] = {label}, expected < {k}"
        );
    }
}

/// FALSIFY-KM-002: Objective non-negative
#[test]
fn falsify_km_002_inertia_non_negative() {
    let data =
        Matrix::from_vec(4, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).expect("valid matrix");

    let mut km = KMeans::new(2).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    assert!(
        km.inertia() >= 0.0,
        "FALSIFIED KM-002: inertia = {} < 0",
        km.inertia()
    );
}

/// FALSIFY-KM-003: Nearest centroid assignment
#[test]
fn falsify_km_003_nearest_centroid() {
    let data = Matrix::column_vector(vec![3.0, 9.0, 12.0, 40.0, 44.0, 47.0, 120.0, 121.0, 180.0]);

    let mut km = KMeans::new(3).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    let labels = km.labels().expect("fitted");
    let centroids = km.centroids().expect("fitted");

    for (i, &assigned) in labels.iter().enumerate() {
        let d_assigned = (data.get(i, 0) - centroids.get(assigned, 0)).abs();
        for c in 0..3 {
            let d_other = (data.get(i, 0) - centroids.get(c, 0)).abs();
            assert!(
                d_assigned <= d_other + 1e-4,
                "FALSIFIED KM-003: point[{i}] assigned to c={assigned} (d={d_assigned}) but c={c} is closer (d={d_other})"
            );
        }
    }
}

/// FALSIFY-KM-004: K=1 puts all points in one cluster at the mean
#[test]
fn falsify_km_004_single_cluster() {
    let data = Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid matrix");

    let mut km = KMeans::new(1).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    let labels = km.predict(&data).expect("fitted");
    assert!(labels.iter().all(|&l| l == 0), "FALSIFIED KM-004: label != 0");

    let centroids = km.centroids().expect("fitted");
    assert!(
        (centroids.get(0, 0) - 3.0).abs() < 1e-4,
        "FALSIFIED KM-004: centroid[0][0] = {}, expected 3.0",
        centroids.get(0, 0)
    );
    assert!(
        (centroids.get(0, 1) - 4.0).abs() < 1e-4,
        "FALSIFIED KM-004: centroid[0][1] = {}, expected 4.0",
        centroids.get(0, 1)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// FALSIFY-KM-005: Determinism under a fixed seed
    #[test]
    fn falsify_km_005_deterministic(
        values in proptest::collection::vec(0u8..=255, 12..64),
        seed in any::<u64>(),
    ) {
        let data = Matrix::column_vector(values.iter().map(|&v| f32::from(v)).collect());
        let distinct = {
            let mut v = values.clone();
            v.sort_unstable();
            v.dedup();
            v.len()
        };
        prop_assume!(distinct >= 3);

        let mut a = KMeans::new(3).with_n_init(5).with_random_state(seed);
        let mut b = KMeans::new(3).with_n_init(5).with_random_state(seed);
        a.fit(&data).expect("fit a");
        b.fit(&data).expect("fit b");

        prop_assert_eq!(a.centroids(), b.centroids());
        prop_assert_eq!(a.labels(), b.labels());
        prop_assert_eq!(a.inertia().to_bits(), b.inertia().to_bits());
    }
}

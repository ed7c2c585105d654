//! Dataset partitioning.
//!
//! This module provides tools for:
//! - Stratified train/validation/test splitting of file lists
//! - Seeded index shuffling

use crate::error::{Result, TumorscopeError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which partition a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training set.
    Train,
    /// Validation set (round selection, threshold tuning).
    Val,
    /// Held-out test set.
    Test,
}

impl Split {
    /// All partitions in canonical order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Lowercase name used in CSV output and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fractions of each class assigned to train, validation and test.
///
/// Train and validation sizes are rounded down; test receives whatever is
/// left, so `test` only documents intent and is not used for sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitRatios {
    /// Training fraction.
    pub train: f64,
    /// Validation fraction.
    pub val: f64,
    /// Test fraction.
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.70,
            val: 0.15,
            test: 0.15,
        }
    }
}

impl SplitRatios {
    /// Checks every ratio is in `[0, 1]` and that train + val fits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the offending ratio.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("train", self.train), ("val", self.val), ("test", self.test)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TumorscopeError::invalid_hyperparameter(
                    name,
                    value,
                    "must be in [0, 1]",
                ));
            }
        }
        if self.train + self.val > 1.0 + 1e-9 {
            return Err(TumorscopeError::invalid_hyperparameter(
                "train + val",
                self.train + self.val,
                "must be <= 1",
            ));
        }
        Ok(())
    }

    /// Sizes `(train, val, test)` for a class of `n` items.
    #[must_use]
    pub fn sizes(&self, n: usize) -> (usize, usize, usize) {
        // The epsilon keeps 0.7 * 10 at 7 despite binary rounding.
        let n_train = ((self.train * n as f64) + 1e-9).floor() as usize;
        let n_val = ((self.val * n as f64) + 1e-9).floor() as usize;
        let n_train = n_train.min(n);
        let n_val = n_val.min(n - n_train);
        (n_train, n_val, n - n_train - n_val)
    }
}

/// One class's items partitioned three ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeWaySplit<T> {
    /// Training items.
    pub train: Vec<T>,
    /// Validation items.
    pub val: Vec<T>,
    /// Test items.
    pub test: Vec<T>,
}

impl<T> ThreeWaySplit<T> {
    /// Items of the given partition.
    #[must_use]
    pub fn get(&self, split: Split) -> &[T] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    /// Total number of items across partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    /// True when no partition holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split each class independently into train/validation/test.
///
/// Classes are shuffled in order with a single generator seeded from
/// `seed`, so the whole partition is reproducible. Per class, the first
/// `floor(train * n)` shuffled items go to train, the next
/// `floor(val * n)` to validation and the rest to test.
///
/// # Errors
///
/// Returns an error if the ratios are invalid.
///
/// # Examples
///
/// ```
/// use tumorscope::model_selection::{stratified_three_way_split, SplitRatios};
///
/// let classes = vec![(0..20).collect::<Vec<u32>>(), (100..110).collect()];
/// let parts = stratified_three_way_split(&classes, SplitRatios::default(), 42).unwrap();
/// assert_eq!(parts[0].train.len(), 14);
/// assert_eq!(parts[1].val.len(), 1);
/// assert_eq!(parts[1].test.len(), 2);
/// ```
pub fn stratified_three_way_split<T: Clone>(
    items_per_class: &[Vec<T>],
    ratios: SplitRatios,
    seed: u64,
) -> Result<Vec<ThreeWaySplit<T>>> {
    ratios.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);

    Ok(items_per_class
        .iter()
        .map(|items| {
            let mut shuffled = items.clone();
            shuffled.shuffle(&mut rng);
            let (n_train, n_val, _) = ratios.sizes(shuffled.len());
            let test = shuffled.split_off(n_train + n_val);
            let val = shuffled.split_off(n_train);
            ThreeWaySplit {
                train: shuffled,
                val,
                test,
            }
        })
        .collect())
}

/// Seeded permutation of `0..n_samples`.
#[must_use]
pub fn shuffle_indices(n_samples: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

//! Decision tree learners.
//!
//! A CART regression tree with squared-error splits serves as the weak
//! learner of [`GradientBoostingClassifier`]. Leaf values can be supplied by
//! the caller so boosting can place a Newton step in each leaf.

mod gradient_boosting;

pub use gradient_boosting::GradientBoostingClassifier;

use crate::error::{Result, TumorscopeError};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};

/// Leaf node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionLeaf {
    /// Predicted value for this leaf
    pub value: f32,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// Internal node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionNode {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f32,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<RegressionTreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node with split condition
    Node(RegressionNode),
    /// Leaf node with value prediction
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    fn predict_row(&self, row: &[f32]) -> f32 {
        let mut node = self;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return leaf.value,
                RegressionTreeNode::Node(internal) => {
                    node = if row[internal.feature_idx] <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

/// Row indices sorted by value, one ordering per feature.
///
/// Computed once per training matrix and shared by every tree fitted on it.
#[derive(Debug, Clone)]
pub struct FeatureOrder {
    orders: Vec<Vec<usize>>,
}

impl FeatureOrder {
    /// Sorts the rows of `x` along every column.
    #[must_use]
    pub fn new(x: &Matrix<f32>) -> Self {
        let orders = (0..x.n_cols())
            .map(|j| {
                let mut idx: Vec<usize> = (0..x.n_rows()).collect();
                idx.sort_by(|&a, &b| x.get(a, j).total_cmp(&x.get(b, j)));
                idx
            })
            .collect();
        Self { orders }
    }
}

/// Best split found for one node.
struct Split {
    feature_idx: usize,
    threshold: f32,
    gain: f64,
}

/// CART regression tree with squared-error splitting.
///
/// # Examples
///
/// ```
/// use tumorscope::primitives::Matrix;
/// use tumorscope::tree::RegressionTree;
///
/// let x = Matrix::column_vector(vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]);
/// let y = [0.0, 0.0, 0.0, 5.0, 5.0, 5.0];
///
/// let mut tree = RegressionTree::new().with_max_depth(1);
/// tree.fit(&x, &y).unwrap();
/// let pred = tree.predict(&x).unwrap();
/// assert!((pred[0] - 0.0).abs() < 1e-6);
/// assert!((pred[5] - 5.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<RegressionTreeNode>,
    max_depth: usize,
    min_samples_leaf: usize,
    n_features: usize,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    /// Creates an unfitted tree with depth 3 and one sample per leaf.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: 3,
            min_samples_leaf: 1,
            n_features: 0,
        }
    }

    /// Sets the maximum depth (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the minimum number of samples required at a leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Depth of the fitted tree, `None` before fitting.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(RegressionTreeNode::depth)
    }

    /// Fits the tree to `targets`, predicting the leaf mean.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or lengths differ.
    pub fn fit(&mut self, x: &Matrix<f32>, targets: &[f32]) -> Result<()> {
        let order = FeatureOrder::new(x);
        let rows: Vec<usize> = (0..x.n_rows()).collect();
        self.fit_rows(x, &order, targets, &rows, &|leaf_rows: &[usize]| {
            let sum: f64 = leaf_rows.iter().map(|&i| f64::from(targets[i])).sum();
            (sum / leaf_rows.len() as f64) as f32
        })
    }

    /// Fits on a subset of rows using a precomputed ordering.
    ///
    /// Splits minimise squared error of `targets`; each leaf's value comes
    /// from `leaf_value` applied to the rows that reach it.
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` is empty or `targets` does not cover `x`.
    pub fn fit_rows(
        &mut self,
        x: &Matrix<f32>,
        order: &FeatureOrder,
        targets: &[f32],
        rows: &[usize],
        leaf_value: &dyn Fn(&[usize]) -> f32,
    ) -> Result<()> {
        if x.n_rows() != targets.len() {
            return Err(TumorscopeError::dimension_mismatch(
                "targets",
                x.n_rows(),
                targets.len(),
            ));
        }
        if rows.is_empty() {
            return Err(TumorscopeError::empty("cannot fit a tree on zero samples"));
        }

        let mut builder = TreeBuilder {
            x,
            order,
            targets,
            leaf_value,
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            in_node: vec![false; x.n_rows()],
        };
        self.root = Some(builder.build(rows, 0));
        self.n_features = x.n_cols();
        Ok(())
    }

    /// Predicts one row. Callers guarantee the tree is fitted and the row
    /// has the training width.
    pub(crate) fn predict_row(&self, row: &[f32]) -> f32 {
        self.root.as_ref().map_or(0.0, |root| root.predict_row(row))
    }

    /// Predicts target values for samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is not fitted or the width differs.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        let root = self
            .root
            .as_ref()
            .ok_or(TumorscopeError::NotFitted {
                model: "RegressionTree",
            })?;
        if x.n_cols() != self.n_features {
            return Err(TumorscopeError::dimension_mismatch(
                "n_features",
                self.n_features,
                x.n_cols(),
            ));
        }
        Ok(Vector::from_vec(
            (0..x.n_rows())
                .map(|i| root.predict_row(x.row_slice(i)))
                .collect(),
        ))
    }
}

struct TreeBuilder<'a> {
    x: &'a Matrix<f32>,
    order: &'a FeatureOrder,
    targets: &'a [f32],
    leaf_value: &'a dyn Fn(&[usize]) -> f32,
    max_depth: usize,
    min_samples_leaf: usize,
    in_node: Vec<bool>,
}

impl TreeBuilder<'_> {
    fn leaf(&self, rows: &[usize]) -> RegressionTreeNode {
        RegressionTreeNode::Leaf(RegressionLeaf {
            value: (self.leaf_value)(rows),
            n_samples: rows.len(),
        })
    }

    fn build(&mut self, rows: &[usize], depth: usize) -> RegressionTreeNode {
        if depth >= self.max_depth || rows.len() < 2 * self.min_samples_leaf {
            return self.leaf(rows);
        }

        let Some(split) = self.find_best_split(rows) else {
            return self.leaf(rows);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&i| self.x.get(i, split.feature_idx) <= split.threshold);

        tracing::trace!(
            feature = split.feature_idx,
            threshold = split.threshold,
            gain = split.gain,
            depth,
            "tree split"
        );

        let left_child = self.build(&left, depth + 1);
        let right_child = self.build(&right, depth + 1);

        RegressionTreeNode::Node(RegressionNode {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(left_child),
            right: Box::new(right_child),
        })
    }

    /// Scans every feature in sorted order, scoring each boundary between
    /// distinct values by its reduction in squared error.
    fn find_best_split(&mut self, rows: &[usize]) -> Option<Split> {
        for &i in rows {
            self.in_node[i] = true;
        }

        let n = rows.len();
        let total: f64 = rows.iter().map(|&i| f64::from(self.targets[i])).sum();
        let base = total * total / n as f64;

        let mut best: Option<Split> = None;
        for (feature_idx, sorted) in self.order.orders.iter().enumerate() {
            let mut left_sum = 0.0;
            let mut left_n = 0usize;
            let mut prev: Option<usize> = None;

            for &i in sorted.iter().filter(|&&i| self.in_node[i]) {
                if let Some(p) = prev {
                    let (a, b) = (self.x.get(p, feature_idx), self.x.get(i, feature_idx));
                    let right_n = n - left_n;
                    if a < b && left_n >= self.min_samples_leaf && right_n >= self.min_samples_leaf
                    {
                        let right_sum = total - left_sum;
                        let gain = left_sum * left_sum / left_n as f64
                            + right_sum * right_sum / right_n as f64
                            - base;
                        if gain > 1e-12 && best.as_ref().map_or(true, |s| gain > s.gain) {
                            let mid = a + (b - a) / 2.0;
                            let threshold = if mid < b { mid } else { a };
                            best = Some(Split {
                                feature_idx,
                                threshold,
                                gain,
                            });
                        }
                    }
                }
                left_sum += f64::from(self.targets[i]);
                left_n += 1;
                prev = Some(i);
            }
        }

        for &i in rows {
            self.in_node[i] = false;
        }
        best
    }
}


#[cfg(test)]
mod tests_gbm_contract;

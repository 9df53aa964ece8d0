//! Exact-greedy CART regression tree on `f64` features.
//!
//! Used as the weak learner of the boosting loop: each tree is fit on the
//! negative gradient of the loss, and the booster may later overwrite leaf
//! values with a loss-specific step.

use crate::classifiers::tree::node::TreeNode;
use crate::classifiers::tree::split_criteria::{NodeStats, SplitCriterion};
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use rand::seq::SliceRandom;

const IMPURITY_EPSILON: f64 = f64::EPSILON;

#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per node, already resolved against the feature count.
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

#[derive(Clone, Debug, Default)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

struct TreeBuilder<'a, R: Rng> {
    x: &'a Array2<f64>,
    y: &'a [f64],
    config: &'a TreeConfig,
    criterion: &'a dyn SplitCriterion,
    rng: &'a mut R,
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Fits a tree on the rows listed in `indices`. `y` is indexed by row like `x`.
    pub fn fit<R: Rng>(
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        config: &TreeConfig,
        criterion: &dyn SplitCriterion,
        rng: &mut R,
    ) -> Self {
        let n_features = x.ncols();
        let mut builder = TreeBuilder {
            x,
            y,
            config,
            criterion,
            rng,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        builder.build_node(indices.to_vec(), 0);

        let TreeBuilder {
            nodes,
            mut importances,
            ..
        } = builder;

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self {
            nodes,
            n_features,
            feature_importances: importances,
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Normalised impurity decrease per feature; all zeros for a single-leaf tree.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Index of the leaf reached by `row`.
    pub fn apply(&self, row: ArrayView1<f64>) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { .. } => return idx,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let v = row[*feature];
                    idx = if v.is_nan() || v <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        match &self.nodes[self.apply(row)] {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { .. } => 0.0,
        }
    }

    pub fn leaf_value(&self, leaf: usize) -> Option<f64> {
        match self.nodes.get(leaf) {
            Some(TreeNode::Leaf { value, .. }) => Some(*value),
            _ => None,
        }
    }

    /// Overwrites the value of a leaf; ignored when `leaf` is not a leaf.
    pub fn set_leaf_value(&mut self, leaf: usize, new_value: f64) {
        if let Some(TreeNode::Leaf { value, .. }) = self.nodes.get_mut(leaf) {
            *value = new_value;
        }
    }
}

impl<R: Rng> TreeBuilder<'_, R> {
    fn build_node(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let current = self.nodes.len();
        let stats = NodeStats::from_targets(indices.iter().map(|&i| self.y[i]));
        let n = indices.len();

        let is_leaf = depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || stats.variance() <= IMPURITY_EPSILON;

        let split = if is_leaf {
            None
        } else {
            self.find_best_split(&indices, &stats)
        };

        let Some(split) = split else {
            self.nodes.push(TreeNode::Leaf {
                value: stats.mean(),
                n_samples: n,
            });
            return current;
        };

        let x = self.x;
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| {
                let v = x[[i, split.feature]];
                v.is_nan() || v <= split.threshold
            });

        let left_stats = NodeStats::from_targets(left_indices.iter().map(|&i| self.y[i]));
        let right_stats = stats.minus(&left_stats);
        self.importances[split.feature] += stats.count * stats.variance()
            - left_stats.count * left_stats.variance()
            - right_stats.count * right_stats.variance();

        self.nodes.push(TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: 0,
            right: 0,
            n_samples: n,
        });

        let left = self.build_node(left_indices, depth + 1);
        let right = self.build_node(right_indices, depth + 1);

        if let TreeNode::Split {
            left: l, right: r, ..
        } = &mut self.nodes[current]
        {
            *l = left;
            *r = right;
        }

        current
    }

    /// Visits features in random order until `max_features` non-constant ones
    /// were examined and a valid split exists, or all features are exhausted.
    fn find_best_split(&mut self, indices: &[usize], parent: &NodeStats) -> Option<SplitCandidate> {
        let n_features = self.x.ncols();
        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(&mut *self.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0usize;

        for feature in order {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }

            let mut values: Vec<(f64, usize)> = Vec::with_capacity(indices.len());
            let mut missing = NodeStats::default();
            for &i in indices {
                let v = self.x[[i, feature]];
                if v.is_nan() {
                    missing.add(self.y[i]);
                } else {
                    values.push((v, i));
                }
            }
            if values.len() < 2 {
                continue;
            }
            values.sort_by(|a, b| a.0.total_cmp(&b.0));
            if values[0].0 == values[values.len() - 1].0 {
                continue;
            }
            visited += 1;

            if let Some(candidate) = self.best_split_for_feature(feature, &values, missing, parent)
            {
                let better = match &best {
                    None => true,
                    Some(current) => candidate.score > current.score,
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    fn best_split_for_feature(
        &self,
        feature: usize,
        sorted: &[(f64, usize)],
        missing: NodeStats,
        parent: &NodeStats,
    ) -> Option<SplitCandidate> {
        let min_leaf = self.config.min_samples_leaf as f64;
        let mut left = missing;
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..sorted.len() - 1 {
            let (value, row) = sorted[pos];
            left.add(self.y[row]);

            let next = sorted[pos + 1].0;
            if next <= value {
                continue;
            }

            let right = parent.minus(&left);
            if left.count < min_leaf || right.count < min_leaf {
                continue;
            }

            let score = self.criterion.proxy_improvement(&left, &right);
            let improves = match &best {
                None => true,
                Some(b) => score > b.score,
            };
            if improves {
                let mut threshold = value / 2.0 + next / 2.0;
                if !threshold.is_finite() || threshold >= next {
                    threshold = value;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }

        best
    }
}

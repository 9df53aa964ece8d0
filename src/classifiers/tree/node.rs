#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode {
    /// Rows with `x[feature] <= threshold` (or `NaN`) go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
    },
    Leaf {
        value: f64,
        n_samples: usize,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Split { n_samples, .. } | TreeNode::Leaf { n_samples, .. } => *n_samples,
        }
    }
}

use crate::classifiers::tree::split_criteria::split_criterion::{NodeStats, SplitCriterion};

/// Plain variance reduction. For a fixed parent, maximising
/// `sum_l^2 / n_l + sum_r^2 / n_r` minimises the children's summed squared error.
#[derive(Debug, Default, Clone, Copy)]
pub struct SquaredError;

impl SquaredError {
    pub fn new() -> Self {
        Self
    }
}

impl SplitCriterion for SquaredError {
    fn name(&self) -> &'static str {
        "squared_error"
    }

    fn proxy_improvement(&self, left: &NodeStats, right: &NodeStats) -> f64 {
        if left.count <= 0.0 || right.count <= 0.0 {
            return f64::NEG_INFINITY;
        }
        left.sum * left.sum / left.count + right.sum * right.sum / right.count
    }
}

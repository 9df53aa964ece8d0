use crate::classifiers::tree::split_criteria::split_criterion::{NodeStats, SplitCriterion};

/// Friedman's improvement score: `n_l * n_r / (n_l + n_r) * (mean_l - mean_r)^2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FriedmanMse;

impl FriedmanMse {
    pub fn new() -> Self {
        Self
    }
}

impl SplitCriterion for FriedmanMse {
    fn name(&self) -> &'static str {
        "friedman_mse"
    }

    fn proxy_improvement(&self, left: &NodeStats, right: &NodeStats) -> f64 {
        let n = left.count + right.count;
        if left.count <= 0.0 || right.count <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let diff = left.mean() - right.mean();
        left.count * right.count / n * diff * diff
    }
}

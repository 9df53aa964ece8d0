use std::fmt::Debug;

/// Running sums of the regression target over a set of samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeStats {
    pub count: f64,
    pub sum: f64,
    pub sum_sq: f64,
}

impl NodeStats {
    pub fn from_targets<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut stats = Self::default();
        for v in values {
            stats.add(v);
        }
        stats
    }

    #[inline]
    pub fn add(&mut self, value: f64) {
        self.count += 1.0;
        self.sum += value;
        self.sum_sq += value * value;
    }

    #[inline]
    pub fn minus(&self, other: &NodeStats) -> NodeStats {
        NodeStats {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count > 0.0 {
            self.sum / self.count
        } else {
            0.0
        }
    }

    /// Mean squared deviation from the mean (the node's MSE impurity).
    pub fn variance(&self) -> f64 {
        if self.count > 0.0 {
            let mean = self.mean();
            (self.sum_sq / self.count - mean * mean).max(0.0)
        } else {
            0.0
        }
    }
}

pub trait SplitCriterion: Debug {
    fn name(&self) -> &'static str;

    /// Score ranking candidate splits of one node; larger is better. Only
    /// comparable between splits of the same parent.
    fn proxy_improvement(&self, left: &NodeStats, right: &NodeStats) -> f64;
}

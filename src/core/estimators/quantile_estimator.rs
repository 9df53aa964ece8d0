/// Order statistics of a column of observations. `NaN` values are ignored.
#[derive(Clone, Debug, Default)]
pub struct QuantileEstimator {
    sorted: Vec<f64>,
}

impl QuantileEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    pub fn count(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Quantile at `q` percent (0..=100) using linear interpolation between
    /// the closest ranks. `None` when nothing was observed.
    pub fn percentile(&self, q: f64) -> Option<f64> {
        if self.sorted.is_empty() {
            return None;
        }
        let q = q.clamp(0.0, 100.0);
        let last = self.sorted.len() - 1;
        let pos = q / 100.0 * last as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let frac = pos - lo as f64;
        let a = self.sorted[lo];
        let b = self.sorted[hi.min(last)];
        Some(a + (b - a) * frac)
    }

    pub fn median(&self) -> Option<f64> {
        self.percentile(50.0)
    }

    pub fn interquantile_range(&self, lo: f64, hi: f64) -> Option<f64> {
        Some(self.percentile(hi)? - self.percentile(lo)?)
    }
}

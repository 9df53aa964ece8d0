use ndarray::Array1;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Share of positions where `y_pred` equals `y_true`; `NaN` for empty input.
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return f64::NAN;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(a, b)| a == b)
        .count();
    correct as f64 / n as f64
}

/// Cohen's kappa: agreement corrected for the agreement expected by chance.
pub fn cohen_kappa(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    ConfusionMatrix::from_labels(y_true, y_pred).kappa()
}

/// Counts of (actual, predicted) label pairs over the sorted union of labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    classes: Vec<f64>,
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut classes: Vec<f64> = y_true.iter().chain(y_pred.iter()).copied().collect();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();

        let k = classes.len();
        let mut counts = vec![vec![0u64; k]; k];
        let position = |v: &f64| classes.binary_search_by(|c| c.total_cmp(v)).ok();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            if let (Some(i), Some(j)) = (position(t), position(p)) {
                counts[i][j] += 1;
            }
        }
        Self { classes, counts }
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Rows predicted as `predicted` whose actual label is `actual`.
    pub fn count(&self, actual: f64, predicted: f64) -> u64 {
        let find = |v: f64| self.classes.iter().position(|c| *c == v);
        match (find(actual), find(predicted)) {
            (Some(i), Some(j)) => self.counts[i][j],
            _ => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> u64 {
        (0..self.classes.len()).map(|i| self.counts[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            f64::NAN
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// `NaN` when chance agreement is already perfect.
    pub fn kappa(&self) -> f64 {
        let total = self.total() as f64;
        if total == 0.0 {
            return f64::NAN;
        }
        let p_observed = self.correct() as f64 / total;
        let k = self.classes.len();
        let p_expected: f64 = (0..k)
            .map(|i| {
                let row: u64 = self.counts[i].iter().sum();
                let col: u64 = (0..k).map(|r| self.counts[r][i]).sum();
                (row as f64 / total) * (col as f64 / total)
            })
            .sum();
        if (1.0 - p_expected).abs() < f64::EPSILON {
            return f64::NAN;
        }
        (p_observed - p_expected) / (1.0 - p_expected)
    }
}

impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:>10}", "actual\\pred")?;
        for c in &self.classes {
            write!(f, " {c:>8}")?;
        }
        writeln!(f)?;
        for (i, c) in self.classes.iter().enumerate() {
            write!(f, "{c:>11}")?;
            for n in &self.counts[i] {
                write!(f, " {n:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

//! Stratified k-fold cross-validation.

use crate::errors::{EvaluationError, PipelineError};
use crate::pipeline::Pipeline;
use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_N_SPLITS: usize = 5;

/// Train and test row indices of one fold, both ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K folds that keep each class's share of rows roughly equal across folds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    /// Shuffle the rows of each class before assigning them to folds.
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self {
            n_splits: DEFAULT_N_SPLITS,
            shuffle: false,
            seed: None,
        }
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            ..Self::default()
        }
    }

    pub fn shuffled(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<Fold>, EvaluationError> {
        let n = y.len();
        if self.n_splits < 2 {
            return Err(EvaluationError::TooFewFolds(self.n_splits));
        }
        if n < self.n_splits {
            return Err(EvaluationError::TooFewRows {
                n,
                n_splits: self.n_splits,
            });
        }

        let mut classes: Vec<f64> = y.to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        let labels: Vec<usize> = y
            .iter()
            .map(|v| {
                classes
                    .binary_search_by(|c| c.total_cmp(v))
                    .unwrap_or_default()
            })
            .collect();
        let k = classes.len();

        let mut class_counts = vec![0usize; k];
        for &l in &labels {
            class_counts[l] += 1;
        }
        if let Some(&smallest) = class_counts.iter().min()
            && smallest < self.n_splits
        {
            warn!(
                smallest_class = smallest,
                n_splits = self.n_splits,
                "least populated class has fewer rows than folds"
            );
        }

        // Deal the label-sorted rows round-robin over folds to get per-fold class quotas.
        let mut sorted_labels = labels.clone();
        sorted_labels.sort_unstable();
        let mut allocation = vec![vec![0usize; k]; self.n_splits];
        for (pos, &label) in sorted_labels.iter().enumerate() {
            allocation[pos % self.n_splits][label] += 1;
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut test_fold = vec![0usize; n];
        for class in 0..k {
            let mut rows: Vec<usize> = (0..n).filter(|&i| labels[i] == class).collect();
            if self.shuffle {
                rows.shuffle(&mut rng);
            }
            let mut cursor = rows.into_iter();
            for (fold, quota) in allocation.iter().enumerate() {
                for row in cursor.by_ref().take(quota[class]) {
                    test_fold[row] = fold;
                }
            }
        }

        Ok((0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..n).partition(|&i| test_fold[i] == fold);
                Fold { train, test }
            })
            .collect())
    }
}

/// Accuracy of a fresh pipeline from `factory` on each fold.
pub fn cross_val_score<F>(
    factory: F,
    x: &Array2<f64>,
    y: &Array1<f64>,
    cv: &StratifiedKFold,
) -> Result<Vec<f64>, EvaluationError>
where
    F: Fn() -> Pipeline,
{
    if x.nrows() != y.len() {
        return Err(PipelineError::LengthMismatch {
            rows: x.nrows(),
            targets: y.len(),
        }
        .into());
    }

    let folds = cv.split(y)?;
    let mut scores = Vec::with_capacity(folds.len());
    for (i, fold) in folds.iter().enumerate() {
        let mut pipeline = factory();
        pipeline.fit(
            &x.select(Axis(0), &fold.train),
            &y.select(Axis(0), &fold.train),
        )?;
        let score = pipeline.score(
            &x.select(Axis(0), &fold.test),
            &y.select(Axis(0), &fold.test),
        )?;
        debug!(fold = i + 1, accuracy = score, "cross-validation fold");
        scores.push(score);
    }
    Ok(scores)
}

pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        f64::NAN
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

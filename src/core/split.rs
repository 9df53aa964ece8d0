use crate::errors::SplitError;
use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEST_SIZE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Share of rows held out for testing.
    pub test_size: f64,
    /// `None` draws the permutation from OS entropy, so every run differs.
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            seed: None,
        }
    }
}

impl SplitOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// The four arrays of a train/test partition, plus the original row indices of each side.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Number of (train, test) rows for `n` rows and a test fraction.
pub fn split_sizes(n: usize, test_size: f64) -> Result<(usize, usize), SplitError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SplitError::InvalidTestSize(test_size));
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_train == 0 || n_test == 0 {
        return Err(SplitError::EmptySide {
            n,
            n_train,
            n_test,
        });
    }
    Ok((n_train, n_test))
}

pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    options: SplitOptions,
) -> Result<TrainTestSplit, SplitError> {
    let n = x.nrows();
    if n == 0 {
        return Err(SplitError::Empty);
    }
    if y.len() != n {
        return Err(SplitError::LengthMismatch {
            rows: n,
            targets: y.len(),
        });
    }

    let (_, n_test) = split_sizes(n, options.test_size)?;

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut permutation: Vec<usize> = (0..n).collect();
    permutation.shuffle(&mut rng);

    let test_indices = permutation[..n_test].to_vec();
    let train_indices = permutation[n_test..].to_vec();

    tracing::debug!(
        n_train = train_indices.len(),
        n_test = test_indices.len(),
        seeded = options.seed.is_some(),
        "split rows"
    );

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

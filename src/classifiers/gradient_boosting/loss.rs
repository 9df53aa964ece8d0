//! Deviance losses for the boosting loop.
//!
//! Labels are passed encoded as class positions `0..n_classes`. Raw scores
//! are an `(n_rows, n_trees_per_stage)` matrix: one column of log-odds for
//! the binomial loss, one column per class for the multinomial loss.

use crate::utils::math::{log_sum_exp, sigmoid, softmax};
use ndarray::{Array2, ArrayView1};
use std::fmt::Debug;

const DENOMINATOR_EPSILON: f64 = 1e-150;

pub trait Loss: Debug {
    fn name(&self) -> &'static str;

    fn n_trees_per_stage(&self) -> usize;

    /// Initial raw score for every tree column, from the class priors.
    fn init_raw(&self, labels: &[usize]) -> Vec<f64>;

    /// Negative gradient of the loss for tree column `k`, one value per row.
    fn negative_gradient(&self, labels: &[usize], raw: &Array2<f64>, k: usize) -> Vec<f64>;

    /// One Newton-Raphson step for the rows of a leaf.
    fn leaf_step(&self, labels: &[usize], residuals: &[f64], rows: &[usize], k: usize) -> f64;

    /// Mean deviance over `rows`.
    fn loss(&self, labels: &[usize], raw: &Array2<f64>, rows: &[usize]) -> f64;

    /// Class probabilities for one row of raw scores.
    fn raw_to_proba(&self, raw: ArrayView1<f64>) -> Vec<f64>;
}

fn class_priors(labels: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &label in labels {
        counts[label] += 1.0;
    }
    let n = labels.len().max(1) as f64;
    counts.into_iter().map(|c| c / n).collect()
}

/// Two-class log loss on log-odds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialDeviance;

impl Loss for BinomialDeviance {
    fn name(&self) -> &'static str {
        "binomial_deviance"
    }

    fn n_trees_per_stage(&self) -> usize {
        1
    }

    fn init_raw(&self, labels: &[usize]) -> Vec<f64> {
        let p = class_priors(labels, 2)[1].clamp(f64::EPSILON, 1.0 - f64::EPSILON);
        vec![(p / (1.0 - p)).ln()]
    }

    fn negative_gradient(&self, labels: &[usize], raw: &Array2<f64>, _k: usize) -> Vec<f64> {
        labels
            .iter()
            .zip(raw.column(0))
            .map(|(&y, &f)| y as f64 - sigmoid(f))
            .collect()
    }

    fn leaf_step(&self, labels: &[usize], residuals: &[f64], rows: &[usize], _k: usize) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for &i in rows {
            let y = labels[i] as f64;
            let r = residuals[i];
            numerator += r;
            denominator += (y - r) * (1.0 - y + r);
        }
        if denominator.abs() < DENOMINATOR_EPSILON {
            0.0
        } else {
            numerator / denominator
        }
    }

    fn loss(&self, labels: &[usize], raw: &Array2<f64>, rows: &[usize]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let total: f64 = rows
            .iter()
            .map(|&i| {
                let f = raw[[i, 0]];
                let y = labels[i] as f64;
                // log(1 + e^f) - y f, without overflow
                f.max(0.0) + (-f.abs()).exp().ln_1p() - y * f
            })
            .sum();
        total / rows.len() as f64
    }

    fn raw_to_proba(&self, raw: ArrayView1<f64>) -> Vec<f64> {
        let p = sigmoid(raw[0]);
        vec![1.0 - p, p]
    }
}

/// K-class log loss on softmax scores.
#[derive(Debug, Clone, Copy)]
pub struct MultinomialDeviance {
    n_classes: usize,
}

impl MultinomialDeviance {
    pub fn new(n_classes: usize) -> Self {
        Self { n_classes }
    }
}

impl Loss for MultinomialDeviance {
    fn name(&self) -> &'static str {
        "multinomial_deviance"
    }

    fn n_trees_per_stage(&self) -> usize {
        self.n_classes
    }

    fn init_raw(&self, labels: &[usize]) -> Vec<f64> {
        class_priors(labels, self.n_classes)
            .into_iter()
            .map(|p| p.max(f64::EPSILON).ln())
            .collect()
    }

    fn negative_gradient(&self, labels: &[usize], raw: &Array2<f64>, k: usize) -> Vec<f64> {
        labels
            .iter()
            .zip(raw.rows())
            .map(|(&y, row)| {
                let scores = row.to_vec();
                let p_k = (scores[k] - log_sum_exp(&scores)).exp();
                let y_k = if y == k { 1.0 } else { 0.0 };
                y_k - p_k
            })
            .collect()
    }

    fn leaf_step(&self, _labels: &[usize], residuals: &[f64], rows: &[usize], _k: usize) -> f64 {
        let k = self.n_classes as f64;
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for &i in rows {
            let r = residuals[i];
            numerator += r;
            denominator += r.abs() * (1.0 - r.abs());
        }
        if denominator.abs() < DENOMINATOR_EPSILON {
            0.0
        } else {
            numerator * (k - 1.0) / k / denominator
        }
    }

    fn loss(&self, labels: &[usize], raw: &Array2<f64>, rows: &[usize]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let total: f64 = rows
            .iter()
            .map(|&i| {
                let scores = raw.row(i).to_vec();
                log_sum_exp(&scores) - scores[labels[i]]
            })
            .sum();
        total / rows.len() as f64
    }

    fn raw_to_proba(&self, raw: ArrayView1<f64>) -> Vec<f64> {
        softmax(&raw.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn binomial_init_is_prior_log_odds() {
        let raw = BinomialDeviance.init_raw(&[0, 1, 1, 1]);
        assert!(approx_eq(raw[0], 3.0f64.ln()));
    }

    #[test]
    fn binomial_gradient_is_label_minus_probability() {
        let raw = Array2::zeros((2, 1));
        let g = BinomialDeviance.negative_gradient(&[0, 1], &raw, 0);
        assert!(approx_eq(g[0], -0.5));
        assert!(approx_eq(g[1], 0.5));
    }

    #[test]
    fn binomial_leaf_step_is_newton_update() {
        // p = 0.5 everywhere: numerator 0.5 + 0.5, denominator 2 * 0.25
        let labels = [1, 1, 0, 0];
        let residuals = [0.5, 0.5, -0.5, -0.5];
        let step = BinomialDeviance.leaf_step(&labels, &residuals, &[0, 1], 0);
        assert!(approx_eq(step, 2.0));
        let all = BinomialDeviance.leaf_step(&labels, &residuals, &[0, 1, 2, 3], 0);
        assert!(approx_eq(all, 0.0));
    }

    #[test]
    fn binomial_loss_at_zero_is_ln2() {
        let raw = Array2::zeros((3, 1));
        let l = BinomialDeviance.loss(&[0, 1, 0], &raw, &[0, 1, 2]);
        assert!(approx_eq(l, 2.0f64.ln()));
    }

    #[test]
    fn binomial_loss_handles_large_scores() {
        let raw = array![[800.0], [-800.0]];
        let l = BinomialDeviance.loss(&[1, 0], &raw, &[0, 1]);
        assert!(l.is_finite());
        assert!(l < 1e-12);
    }

    #[test]
    fn binomial_proba_columns_sum_to_one() {
        let p = BinomialDeviance.raw_to_proba(array![0.3].view());
        assert_eq!(p.len(), 2);
        assert!(approx_eq(p[0] + p[1], 1.0));
        assert!(p[1] > p[0]);
    }

    #[test]
    fn multinomial_init_is_log_prior() {
        let loss = MultinomialDeviance::new(3);
        let raw = loss.init_raw(&[0, 0, 1, 2]);
        assert!(approx_eq(raw[0], 0.5f64.ln()));
        assert!(approx_eq(raw[1], 0.25f64.ln()));
        assert!(approx_eq(raw[2], 0.25f64.ln()));
    }

    #[test]
    fn multinomial_gradients_sum_to_zero_per_row() {
        let loss = MultinomialDeviance::new(3);
        let raw = array![[0.2, -1.0, 0.5], [1.0, 1.0, 1.0]];
        let labels = [2, 0];
        let grads: Vec<Vec<f64>> = (0..3)
            .map(|k| loss.negative_gradient(&labels, &raw, k))
            .collect();
        for row in 0..2 {
            let s: f64 = grads.iter().map(|g| g[row]).sum();
            assert!(approx_eq(s, 0.0));
        }
        assert!(approx_eq(grads[0][1], 1.0 - 1.0 / 3.0));
    }

    #[test]
    fn multinomial_leaf_step_scales_by_k_minus_one_over_k() {
        let loss = MultinomialDeviance::new(3);
        let residuals = [0.5, 0.5];
        let step = loss.leaf_step(&[0, 0], &residuals, &[0, 1], 0);
        // (2/3) * 1.0 / 0.5
        assert!(approx_eq(step, 4.0 / 3.0));
    }

    #[test]
    fn multinomial_leaf_step_zero_denominator() {
        let loss = MultinomialDeviance::new(3);
        assert_eq!(loss.leaf_step(&[0], &[0.0], &[0], 0), 0.0);
    }

    #[test]
    fn multinomial_loss_uniform_is_ln_k() {
        let loss = MultinomialDeviance::new(4);
        let raw = Array2::zeros((2, 4));
        let l = loss.loss(&[0, 3], &raw, &[0, 1]);
        assert!(approx_eq(l, 4.0f64.ln()));
    }
}

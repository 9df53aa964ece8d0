//! Gradient-boosted regression trees for classification.
//!
//! Two classes are fit with the binomial deviance (one tree per stage on the
//! log-odds), more classes with the multinomial deviance (one tree per class
//! and stage). Each stage draws a subsample of the rows without replacement,
//! fits its trees on the in-bag rows and replaces leaf values with a Newton
//! step of the loss.

use crate::classifiers::classifier::Classifier;
use crate::classifiers::gradient_boosting::loss::{BinomialDeviance, Loss, MultinomialDeviance};
use crate::classifiers::gradient_boosting::params::GradientBoostingParams;
use crate::classifiers::tree::{RegressionTree, TreeConfig};
use crate::errors::PipelineError;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use std::collections::BTreeMap;
use tracing::{debug, info};

const MODEL_NAME: &str = "GradientBoostingClassifier";

#[derive(Debug)]
struct FittedEnsemble {
    classes: Vec<f64>,
    n_features: usize,
    loss: Box<dyn Loss>,
    init_raw: Vec<f64>,
    /// `stages[i][k]` is the tree for column `k` of stage `i`.
    stages: Vec<Vec<RegressionTree>>,
    train_score: Vec<f64>,
    oob_improvement: Option<Vec<f64>>,
    feature_importances: Vec<f64>,
}

#[derive(Debug, Default)]
pub struct GradientBoostingClassifier {
    params: GradientBoostingParams,
    fitted: Option<FittedEnsemble>,
}

impl GradientBoostingClassifier {
    pub fn new(params: GradientBoostingParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    pub fn params(&self) -> &GradientBoostingParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_features)
    }

    /// Normalised impurity-based importances, summing to 1 unless no tree split.
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.feature_importances.as_slice())
    }

    /// Mean in-bag deviance after each stage.
    pub fn train_score(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.train_score.as_slice())
    }

    /// Out-of-bag deviance decrease of each stage; only recorded when `subsample < 1`.
    pub fn oob_improvement(&self) -> Option<&[f64]> {
        self.fitted
            .as_ref()
            .and_then(|f| f.oob_improvement.as_deref())
    }

    pub fn estimators(&self) -> Option<&[Vec<RegressionTree>]> {
        self.fitted.as_ref().map(|f| f.stages.as_slice())
    }

    pub fn loss_name(&self) -> Option<&'static str> {
        self.fitted.as_ref().map(|f| f.loss.name())
    }

    /// Raw ensemble scores: one column of log-odds for two classes,
    /// one column per class otherwise.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        let fitted = self.check_input(x)?;
        let n_columns = fitted.loss.n_trees_per_stage();
        let mut raw = Array2::from_shape_fn((x.nrows(), n_columns), |(_, k)| fitted.init_raw[k]);
        let lr = self.params.learning_rate;

        for stage in &fitted.stages {
            for (k, tree) in stage.iter().enumerate() {
                for (i, row) in x.rows().into_iter().enumerate() {
                    raw[[i, k]] += lr * tree.predict_row(row);
                }
            }
        }
        Ok(raw)
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<&FittedEnsemble, PipelineError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(PipelineError::NotFitted(MODEL_NAME))?;
        if x.ncols() != fitted.n_features {
            return Err(PipelineError::FeatureCountMismatch {
                expected: fitted.n_features,
                found: x.ncols(),
            });
        }
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyInput);
        }
        Ok(fitted)
    }
}

fn encode_labels(y: &Array1<f64>) -> (Vec<f64>, Vec<usize>) {
    let mut classes: Vec<f64> = y.to_vec();
    classes.sort_by(|a, b| a.total_cmp(b));
    classes.dedup();
    let labels = y
        .iter()
        .map(|v| {
            classes
                .binary_search_by(|c| c.total_cmp(v))
                .unwrap_or_default()
        })
        .collect();
    (classes, labels)
}

/// Rows drawn for each stage: `floor(subsample * n)`, at least one.
fn in_bag_rows(subsample: f64, n: usize) -> usize {
    if subsample < 1.0 {
        ((subsample * n as f64).floor() as usize).max(1)
    } else {
        n
    }
}

fn complement(n: usize, sorted_inbag: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(n - sorted_inbag.len());
    let mut it = sorted_inbag.iter().peekable();
    for i in 0..n {
        if it.peek() == Some(&&i) {
            it.next();
        } else {
            out.push(i);
        }
    }
    out
}

impl Classifier for GradientBoostingClassifier {
    fn name(&self) -> &'static str {
        "gradient-boosting"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), PipelineError> {
        self.params.validate()?;
        let n = x.nrows();
        if n == 0 {
            return Err(PipelineError::EmptyInput);
        }
        if y.len() != n {
            return Err(PipelineError::LengthMismatch {
                rows: n,
                targets: y.len(),
            });
        }

        let (classes, labels) = encode_labels(y);
        if classes.len() < 2 {
            return Err(PipelineError::SingleClass(classes[0]));
        }

        let loss: Box<dyn Loss> = if classes.len() == 2 {
            Box::new(BinomialDeviance)
        } else {
            Box::new(MultinomialDeviance::new(classes.len()))
        };

        let params = &self.params;
        let n_features = x.ncols();
        let n_columns = loss.n_trees_per_stage();
        let tree_config = TreeConfig {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: params.max_features.resolve(n_features),
        };
        let criterion = params.criterion.build();
        let mut rng = match params.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let init_raw = loss.init_raw(&labels);
        let mut raw = Array2::from_shape_fn((n, n_columns), |(_, k)| init_raw[k]);

        let use_oob = params.subsample < 1.0;
        let n_inbag = in_bag_rows(params.subsample, n);

        info!(
            rows = n,
            features = n_features,
            classes = classes.len(),
            loss = loss.name(),
            n_estimators = params.n_estimators,
            max_features = tree_config.max_features,
            in_bag = n_inbag,
            "fitting gradient boosting"
        );

        let mut stages = Vec::with_capacity(params.n_estimators);
        let mut train_score = Vec::with_capacity(params.n_estimators);
        let mut oob_improvement = use_oob.then(|| Vec::with_capacity(params.n_estimators));
        let mut importance_sum = vec![0.0; n_features];
        let mut n_trees = 0usize;

        for stage_index in 0..params.n_estimators {
            let (inbag, oob) = if use_oob {
                let mut inbag = index::sample(&mut rng, n, n_inbag).into_vec();
                inbag.sort_unstable();
                let oob = complement(n, &inbag);
                (inbag, oob)
            } else {
                ((0..n).collect::<Vec<_>>(), Vec::new())
            };

            let oob_before = (!oob.is_empty()).then(|| loss.loss(&labels, &raw, &oob));

            let residuals: Vec<Vec<f64>> = (0..n_columns)
                .map(|k| loss.negative_gradient(&labels, &raw, k))
                .collect();

            let mut trees = Vec::with_capacity(n_columns);
            for (k, residual) in residuals.iter().enumerate() {
                let mut tree = RegressionTree::fit(
                    x,
                    residual,
                    &inbag,
                    &tree_config,
                    criterion.as_ref(),
                    &mut rng,
                );

                let mut leaf_rows: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
                for &i in &inbag {
                    leaf_rows.entry(tree.apply(x.row(i))).or_default().push(i);
                }
                for (leaf, rows) in &leaf_rows {
                    let step = loss.leaf_step(&labels, residual, rows, k);
                    tree.set_leaf_value(*leaf, step);
                }

                for (i, row) in x.rows().into_iter().enumerate() {
                    raw[[i, k]] += params.learning_rate * tree.predict_row(row);
                }

                for (acc, imp) in importance_sum.iter_mut().zip(tree.feature_importances()) {
                    *acc += imp;
                }
                n_trees += 1;
                trees.push(tree);
            }
            stages.push(trees);

            let score = loss.loss(&labels, &raw, &inbag);
            train_score.push(score);

            let improvement = oob_before.map(|before| before - loss.loss(&labels, &raw, &oob));
            if let (Some(history), Some(delta)) = (oob_improvement.as_mut(), improvement) {
                history.push(delta);
            }

            debug!(
                stage = stage_index + 1,
                train_loss = score,
                oob_improvement = improvement,
                "boosting stage"
            );
        }

        let mut feature_importances: Vec<f64> =
            importance_sum.iter().map(|v| v / n_trees as f64).collect();
        let total: f64 = feature_importances.iter().sum();
        if total > 0.0 {
            feature_importances.iter_mut().for_each(|v| *v /= total);
        }

        self.fitted = Some(FittedEnsemble {
            classes,
            n_features,
            loss,
            init_raw,
            stages,
            train_score,
            oob_improvement,
            feature_importances,
        });
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        let raw = self.decision_function(x)?;
        let fitted = self.check_input(x)?;
        let n_classes = fitted.classes.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (mut out, scores) in proba.rows_mut().into_iter().zip(raw.rows()) {
            for (slot, p) in out.iter_mut().zip(fitted.loss.raw_to_proba(scores)) {
                *slot = p;
            }
        }
        Ok(proba)
    }

    fn classes(&self) -> &[f64] {
        self.fitted
            .as_ref()
            .map(|f| f.classes.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::gradient_boosting::params::MaxFeatures;
    use ndarray::array;

    fn params(seed: u64) -> GradientBoostingParams {
        GradientBoostingParams {
            n_estimators: 20,
            max_depth: 3,
            min_samples_leaf: 1,
            min_samples_split: 2,
            max_features: MaxFeatures::Fraction(1.0),
            subsample: 1.0,
            random_state: Some(seed),
            ..Default::default()
        }
    }

    fn separable(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                ((i * 7) % 5) as f64
            }
        });
        let y = Array1::from_shape_fn(n, |i| if i < n / 2 { 0.0 } else { 1.0 });
        (x, y)
    }

    #[test]
    fn learns_separable_binary_problem() {
        let (x, y) = separable(40);
        let mut model = GradientBoostingClassifier::new(params(7));
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert_eq!(pred, y);
        assert_eq!(model.classes(), &[0.0, 1.0]);
        assert_eq!(model.loss_name(), Some("binomial_deviance"));
    }

    #[test]
    fn training_deviance_decreases() {
        let (x, y) = separable(40);
        let mut model = GradientBoostingClassifier::new(params(1));
        model.fit(&x, &y).unwrap();
        let scores = model.train_score().unwrap();
        assert_eq!(scores.len(), 20);
        assert!(scores[19] < scores[0]);
        assert!(model.oob_improvement().is_none());
    }

    #[test]
    fn subsampling_records_oob_improvement() {
        let (x, y) = separable(40);
        let mut model = GradientBoostingClassifier::new(GradientBoostingParams {
            subsample: 0.5,
            ..params(3)
        });
        model.fit(&x, &y).unwrap();
        assert_eq!(model.oob_improvement().unwrap().len(), 20);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = separable(20);
        let mut model = GradientBoostingClassifier::new(params(2));
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (20, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn keeps_original_label_values() {
        let x = array![[0.0], [1.0], [2.0], [10.0], [11.0], [12.0]];
        let y = array![-3.0, -3.0, -3.0, 8.0, 8.0, 8.0];
        let mut model = GradientBoostingClassifier::new(params(0));
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&array![[1.5], [11.5]]).unwrap();
        assert_eq!(pred, array![-3.0, 8.0]);
    }

    #[test]
    fn multiclass_uses_one_tree_per_class() {
        let x = Array2::from_shape_fn((30, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(30, |i| (i / 10) as f64);
        let mut model = GradientBoostingClassifier::new(params(4));
        model.fit(&x, &y).unwrap();

        let stages = model.estimators().unwrap();
        assert_eq!(stages.len(), 20);
        assert!(stages.iter().all(|s| s.len() == 3));
        assert_eq!(model.decision_function(&x).unwrap().ncols(), 3);
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn default_subsample_draws_exported_stage_sizes() {
        let subsample = GradientBoostingParams::default().subsample;
        assert_eq!(in_bag_rows(subsample, 180), 63);
        assert_eq!(in_bag_rows(subsample, 100), 35);
        assert_eq!(in_bag_rows(subsample, 2), 1);
        assert_eq!(in_bag_rows(1.0, 7), 7);
    }

    #[test]
    fn same_seed_same_model() {
        let (x, y) = separable(40);
        let p = GradientBoostingParams {
            subsample: GradientBoostingParams::default().subsample,
            max_features: MaxFeatures::Fraction(0.5),
            ..params(11)
        };
        let mut a = GradientBoostingClassifier::new(p.clone());
        let mut b = GradientBoostingClassifier::new(p);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(
            a.decision_function(&x).unwrap(),
            b.decision_function(&x).unwrap()
        );
    }

    #[test]
    fn importances_favour_informative_feature() {
        let (x, y) = separable(40);
        let mut model = GradientBoostingClassifier::new(params(5));
        model.fit(&x, &y).unwrap();
        let imp = model.feature_importances().unwrap();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(imp[0] > imp[1]);
    }

    #[test]
    fn errors() {
        let (x, y) = separable(10);
        let model = GradientBoostingClassifier::default();
        assert_eq!(
            model.predict(&x).unwrap_err(),
            PipelineError::NotFitted(MODEL_NAME)
        );

        let mut model = GradientBoostingClassifier::new(params(0));
        let single = Array1::from_elem(10, 2.0);
        assert_eq!(
            model.fit(&x, &single).unwrap_err(),
            PipelineError::SingleClass(2.0)
        );

        model.fit(&x, &y).unwrap();
        assert_eq!(
            model.predict(&Array2::zeros((3, 5))).unwrap_err(),
            PipelineError::FeatureCountMismatch {
                expected: 2,
                found: 5
            }
        );

        assert_eq!(
            model.fit(&x, &array![0.0, 1.0]).unwrap_err(),
            PipelineError::LengthMismatch {
                rows: 10,
                targets: 2
            }
        );
    }
}

use crate::classifiers::Classifier;
use crate::errors::PipelineError;
use ndarray::{Array1, Array2};

/// Always predicts the most frequent training label; checks the feature count like a real model.
#[derive(Default)]
pub struct MajorityClassifier {
    classes: Vec<f64>,
    majority: usize,
    n_features: usize,
}

impl Classifier for MajorityClassifier {
    fn name(&self) -> &'static str {
        "majority"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), PipelineError> {
        let mut classes = y.to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        let counts: Vec<usize> = classes
            .iter()
            .map(|c| y.iter().filter(|v| *v == c).count())
            .collect();
        self.majority = counts
            .iter()
            .enumerate()
            .max_by_key(|(i, n)| (**n, std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
            .unwrap_or_default();
        self.classes = classes;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        if self.classes.is_empty() {
            return Err(PipelineError::NotFitted("MajorityClassifier"));
        }
        if x.ncols() != self.n_features {
            return Err(PipelineError::FeatureCountMismatch {
                expected: self.n_features,
                found: x.ncols(),
            });
        }
        let mut proba = Array2::zeros((x.nrows(), self.classes.len()));
        proba.column_mut(self.majority).fill(1.0);
        Ok(proba)
    }

    fn classes(&self) -> &[f64] {
        &self.classes
    }
}

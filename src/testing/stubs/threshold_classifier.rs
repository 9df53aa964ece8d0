use crate::classifiers::Classifier;
use crate::errors::PipelineError;
use ndarray::{Array1, Array2};

/// Predicts the largest fitted class when `x[feature] > threshold`, the smallest otherwise.
pub struct ThresholdClassifier {
    feature: usize,
    threshold: f64,
    classes: Vec<f64>,
}

impl ThresholdClassifier {
    pub fn new(feature: usize, threshold: f64) -> Self {
        Self {
            feature,
            threshold,
            classes: Vec::new(),
        }
    }
}

impl Classifier for ThresholdClassifier {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<(), PipelineError> {
        let mut classes = y.to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        self.classes = classes;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        if self.classes.is_empty() {
            return Err(PipelineError::NotFitted("ThresholdClassifier"));
        }
        let k = self.classes.len();
        let mut proba = Array2::zeros((x.nrows(), k));
        for (i, row) in x.rows().into_iter().enumerate() {
            let column = if row[self.feature] > self.threshold { k - 1 } else { 0 };
            proba[[i, column]] = 1.0;
        }
        Ok(proba)
    }

    fn classes(&self) -> &[f64] {
        &self.classes
    }
}

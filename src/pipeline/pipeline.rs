use crate::classifiers::Classifier;
use crate::errors::PipelineError;
use crate::evaluation::accuracy;
use crate::preprocessing::Transformer;
use ndarray::{Array1, Array2};
use tracing::info;

/// A chain of transformers followed by one final classifier.
///
/// `fit` runs `fit_transform` through every step in order and fits the
/// classifier on the result; prediction runs `transform` through the same
/// steps before handing rows to the classifier.
pub struct Pipeline {
    steps: Vec<Box<dyn Transformer>>,
    classifier: Box<dyn Classifier>,
}

impl Pipeline {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self {
            steps: Vec::new(),
            classifier,
        }
    }

    /// Appends a transformer; steps run in insertion order.
    pub fn with_step(mut self, step: Box<dyn Transformer>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Box<dyn Transformer>] {
        &self.steps
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(self.classifier.name()))
            .collect()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), PipelineError> {
        if x.nrows() != y.len() {
            return Err(PipelineError::LengthMismatch {
                rows: x.nrows(),
                targets: y.len(),
            });
        }

        let mut current = x.clone();
        for step in self.steps.iter_mut() {
            current = step.fit_transform(&current)?;
        }
        self.classifier.fit(&current, y)?;

        info!(
            rows = x.nrows(),
            features = x.ncols(),
            steps = ?self.step_names(),
            "pipeline fitted"
        );
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        let mut current = x.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
        let transformed = self.transform(x)?;
        self.classifier.predict(&transformed)
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        let transformed = self.transform(x)?;
        self.classifier.predict_proba(&transformed)
    }

    /// Accuracy of `predict(x)` against `y`.
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64, PipelineError> {
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(PipelineError::LengthMismatch {
                rows: predictions.len(),
                targets: y.len(),
            });
        }
        Ok(accuracy(y, &predictions))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::RobustScaler;
    use crate::testing::{
        FitSpyTransformer, MajorityClassifier, ShiftTransformer, ThresholdClassifier,
    };
    use ndarray::array;

    #[test]
    fn steps_run_in_order_before_classifier() {
        let x = array![[0.0], [1.0], [10.0], [11.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut pipeline = Pipeline::new(Box::new(ThresholdClassifier::new(0, 0.0)))
            .with_step(Box::new(ShiftTransformer::new(-5.0)));
        pipeline.fit(&x, &y).unwrap();
        assert_eq!(pipeline.predict(&x).unwrap(), y);
        assert_eq!(pipeline.score(&x, &y).unwrap(), 1.0);
        assert_eq!(pipeline.step_names(), vec!["shift", "threshold"]);
    }

    #[test]
    fn fit_transforms_once_and_predict_only_transforms() {
        let (spy, handle) = FitSpyTransformer::new();
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.0, 1.0, 1.0];
        let mut pipeline =
            Pipeline::new(Box::new(MajorityClassifier::default())).with_step(Box::new(spy));
        pipeline.fit(&x, &y).unwrap();
        assert_eq!((handle.fit_count(), handle.transform_count()), (1, 1));

        pipeline.predict(&x).unwrap();
        pipeline.predict(&x).unwrap();
        assert_eq!((handle.fit_count(), handle.transform_count()), (1, 3));
        assert_eq!(pipeline.predict(&x).unwrap(), array![1.0, 1.0, 1.0]);
    }

    #[test]
    fn unfitted_pipeline_reports_first_unfitted_stage() {
        let pipeline = Pipeline::new(Box::new(MajorityClassifier::default()))
            .with_step(Box::new(RobustScaler::new()));
        assert_eq!(
            pipeline.predict(&array![[1.0]]).unwrap_err(),
            PipelineError::NotFitted("RobustScaler")
        );
    }

    #[test]
    fn width_mismatch_is_rejected_after_fit() {
        let x = array![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]];
        let y = array![0.0, 1.0, 1.0];
        let mut pipeline = Pipeline::new(Box::new(MajorityClassifier::default()))
            .with_step(Box::new(RobustScaler::new()));
        pipeline.fit(&x, &y).unwrap();
        assert_eq!(
            pipeline.predict(&array![[1.0]]).unwrap_err(),
            PipelineError::FeatureCountMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn length_mismatch_on_fit() {
        let mut pipeline = Pipeline::new(Box::new(MajorityClassifier::default()));
        assert!(matches!(
            pipeline.fit(&array![[0.0], [1.0]], &array![1.0]),
            Err(PipelineError::LengthMismatch { rows: 2, targets: 1 })
        ));
    }
}

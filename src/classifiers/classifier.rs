use crate::errors::PipelineError;
use crate::utils::math::argmax;
use ndarray::{Array1, Array2};

pub trait Classifier {
    fn name(&self) -> &'static str;

    /// Learns from `x` (one row per sample) and the matching labels in `y`.
    /// Fitting again discards whatever was learned before.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), PipelineError>;

    /// One row per sample, one column per entry of [`Classifier::classes`].
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError>;

    /// Sorted labels seen during fit; empty before.
    fn classes(&self) -> &[f64];

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, PipelineError> {
        let proba = self.predict_proba(x)?;
        let classes = self.classes();
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| classes[argmax(&row.to_vec())])
            .collect())
    }
}

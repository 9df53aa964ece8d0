use crate::errors::PipelineError;
use ndarray::Array2;

/// A fitted-then-applied feature transformation, the non-final stage of a pipeline.
pub trait Transformer {
    fn name(&self) -> &'static str;
    fn fit(&mut self, x: &Array2<f64>) -> Result<(), PipelineError>;
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError>;

    fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        self.fit(x)?;
        self.transform(x)
    }
}

use crate::errors::PipelineError;
use crate::preprocessing::Transformer;
use ndarray::Array2;

/// Adds a constant to every cell.
pub struct ShiftTransformer {
    offset: f64,
    n_features: Option<usize>,
}

impl ShiftTransformer {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            n_features: None,
        }
    }
}

impl Transformer for ShiftTransformer {
    fn name(&self) -> &'static str {
        "shift"
    }

    fn fit(&mut self, x: &Array2<f64>) -> Result<(), PipelineError> {
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        match self.n_features {
            None => Err(PipelineError::NotFitted("ShiftTransformer")),
            Some(n) if n != x.ncols() => Err(PipelineError::FeatureCountMismatch {
                expected: n,
                found: x.ncols(),
            }),
            Some(_) => Ok(x + self.offset),
        }
    }
}

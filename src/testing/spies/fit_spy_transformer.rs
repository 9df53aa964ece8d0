use crate::errors::PipelineError;
use crate::preprocessing::Transformer;
use ndarray::Array2;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Default)]
struct Calls {
    fit: AtomicU64,
    transform: AtomicU64,
}

pub struct FitSpyHandle(Arc<Calls>);
impl FitSpyHandle {
    pub fn fit_count(&self) -> u64 {
        self.0.fit.load(Ordering::Relaxed)
    }

    pub fn transform_count(&self) -> u64 {
        self.0.transform.load(Ordering::Relaxed)
    }
}

/// Identity transformer counting how often it is fitted and applied.
pub struct FitSpyTransformer {
    calls: Arc<Calls>,
}

impl FitSpyTransformer {
    pub fn new() -> (Self, FitSpyHandle) {
        let calls = Arc::new(Calls::default());
        (
            Self {
                calls: calls.clone(),
            },
            FitSpyHandle(calls),
        )
    }
}

impl Transformer for FitSpyTransformer {
    fn name(&self) -> &'static str {
        "fit-spy"
    }

    fn fit(&mut self, _x: &Array2<f64>) -> Result<(), PipelineError> {
        self.calls.fit.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        self.calls.transform.fetch_add(1, Ordering::Relaxed);
        Ok(x.clone())
    }
}

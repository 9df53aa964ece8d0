//! Median/IQR feature scaling.

use crate::core::estimators::QuantileEstimator;
use crate::errors::PipelineError;
use crate::preprocessing::transformer::Transformer;
use crate::utils::math::normal_quantile;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_quantile_range() -> (f64, f64) {
    (25.0, 75.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScalerParams {
    /// Subtract the per-feature median.
    #[serde(default = "default_true")]
    pub with_centering: bool,
    /// Divide by the per-feature quantile range.
    #[serde(default = "default_true")]
    pub with_scaling: bool,
    /// Lower and upper percentiles of the range used for scaling.
    #[serde(default = "default_quantile_range")]
    pub quantile_range: (f64, f64),
    /// Rescale so that normally distributed features end with unit variance.
    #[serde(default)]
    pub unit_variance: bool,
}

impl Default for RobustScalerParams {
    fn default() -> Self {
        Self {
            with_centering: true,
            with_scaling: true,
            quantile_range: default_quantile_range(),
            unit_variance: false,
        }
    }
}

impl RobustScalerParams {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let (lo, hi) = self.quantile_range;
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo > hi {
            return Err(PipelineError::InvalidParameter {
                name: "quantile_range",
                reason: format!("expected 0 <= lo <= hi <= 100, got ({lo}, {hi})"),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct FittedScaling {
    n_features: usize,
    center: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

/// Centers features on their median and divides them by their interquartile range.
#[derive(Debug, Clone, Default)]
pub struct RobustScaler {
    params: RobustScalerParams,
    fitted: Option<FittedScaling>,
}

impl RobustScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: RobustScalerParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    pub fn params(&self) -> &RobustScalerParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Per-feature medians learned by `fit` (when centering is enabled).
    pub fn center(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().and_then(|f| f.center.as_ref())
    }

    /// Per-feature scales learned by `fit` (when scaling is enabled).
    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().and_then(|f| f.scale.as_ref())
    }

    pub fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_features)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        let fitted = self.check_input(x)?;
        let mut out = x.to_owned();
        if let Some(scale) = &fitted.scale {
            out *= scale;
        }
        if let Some(center) = &fitted.center {
            out += center;
        }
        Ok(out)
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<&FittedScaling, PipelineError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(PipelineError::NotFitted("RobustScaler"))?;
        if x.ncols() != fitted.n_features {
            return Err(PipelineError::FeatureCountMismatch {
                expected: fitted.n_features,
                found: x.ncols(),
            });
        }
        Ok(fitted)
    }
}

impl Transformer for RobustScaler {
    fn name(&self) -> &'static str {
        "robust-scaler"
    }

    fn fit(&mut self, x: &Array2<f64>) -> Result<(), PipelineError> {
        self.params.validate()?;
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyInput);
        }

        let (q_lo, q_hi) = self.params.quantile_range;
        let n_features = x.ncols();
        let mut center = Array1::zeros(n_features);
        let mut scale = Array1::ones(n_features);

        for (j, column) in x.axis_iter(Axis(1)).enumerate() {
            let estimator = QuantileEstimator::from_values(column.iter().copied());
            if estimator.is_empty() {
                tracing::warn!(feature = j, "feature has no observed values; leaving it unscaled");
                continue;
            }
            center[j] = estimator.median().unwrap_or(0.0);

            let range = estimator.interquantile_range(q_lo, q_hi).unwrap_or(0.0);
            if range == 0.0 || !range.is_finite() {
                tracing::debug!(feature = j, "zero quantile range; using scale 1");
            } else {
                scale[j] = range;
            }
        }

        if self.params.unit_variance {
            let adjust = normal_quantile(q_hi / 100.0) - normal_quantile(q_lo / 100.0);
            if adjust.is_finite() && adjust > 0.0 {
                scale.mapv_inplace(|s| s / adjust);
            }
        }

        self.fitted = Some(FittedScaling {
            n_features,
            center: self.params.with_centering.then_some(center),
            scale: self.params.with_scaling.then_some(scale),
        });
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        let fitted = self.check_input(x)?;
        let mut out = x.to_owned();
        if let Some(center) = &fitted.center {
            out -= center;
        }
        if let Some(scale) = &fitted.scale {
            out /= scale;
        }
        Ok(out)
    }
}

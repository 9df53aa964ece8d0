use crate::classifiers::{GradientBoostingClassifier, GradientBoostingParams};
use crate::pipeline::Pipeline;
use crate::preprocessing::{RobustScaler, RobustScalerParams};

/// Robust scaling followed by gradient boosting, with the tuned hyperparameters
/// (`learning_rate 0.1`, `max_depth 8`, `max_features 0.1`, `min_samples_leaf 4`,
/// `min_samples_split 3`, `n_estimators 100`, `subsample 0.35000000000000003`).
pub fn exported_pipeline(seed: Option<u64>) -> Pipeline {
    configured_pipeline(
        RobustScalerParams::default(),
        GradientBoostingParams {
            random_state: seed,
            ..GradientBoostingParams::default()
        },
    )
}

/// Same two-stage layout with caller-supplied parameters.
pub fn configured_pipeline(
    scaler: RobustScalerParams,
    classifier: GradientBoostingParams,
) -> Pipeline {
    Pipeline::new(Box::new(GradientBoostingClassifier::new(classifier)))
        .with_step(Box::new(RobustScaler::with_params(scaler)))
}

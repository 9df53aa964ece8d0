mod gradient_boosting_classifier;
pub mod loss;
mod params;

pub use gradient_boosting_classifier::GradientBoostingClassifier;
pub use params::{Criterion, GradientBoostingParams, MaxFeatures, MaxFeaturesRule};

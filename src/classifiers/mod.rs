mod classifier;
pub mod gradient_boosting;
pub mod tree;

pub use classifier::Classifier;
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingParams};

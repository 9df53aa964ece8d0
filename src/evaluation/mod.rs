mod cross_validation;
mod metrics;
mod report;

pub use cross_validation::{DEFAULT_N_SPLITS, Fold, StratifiedKFold, cross_val_score, mean};
pub use metrics::{ConfusionMatrix, accuracy, cohen_kappa};
pub use report::Report;

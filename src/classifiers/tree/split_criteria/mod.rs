mod friedman_mse;
mod split_criterion;
mod squared_error;

pub use friedman_mse::FriedmanMse;
pub use split_criterion::{NodeStats, SplitCriterion};
pub use squared_error::SquaredError;

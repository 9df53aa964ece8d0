mod quantile_estimator;

pub use quantile_estimator::QuantileEstimator;

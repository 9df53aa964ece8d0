mod robust_scaler;
mod transformer;

pub use robust_scaler::{RobustScaler, RobustScalerParams};
pub use transformer::Transformer;

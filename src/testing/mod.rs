mod datasets;
mod dummies {
    pub mod majority_classifier;
    pub mod shift_transformer;
}
mod spies {
    pub mod fit_spy_transformer;
}
mod stubs {
    pub mod threshold_classifier;
}

pub use datasets::{blobs, to_delimited};
pub use dummies::majority_classifier::MajorityClassifier;
pub use dummies::shift_transformer::ShiftTransformer;
pub use spies::fit_spy_transformer::{FitSpyHandle, FitSpyTransformer};
pub use stubs::threshold_classifier::ThresholdClassifier;

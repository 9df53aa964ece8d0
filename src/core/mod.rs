pub mod dataset;
pub mod estimators;
pub mod split;
pub mod table_header;

pub use dataset::Dataset;
pub use split::{SplitOptions, TrainTestSplit, train_test_split};
pub use table_header::TableHeader;

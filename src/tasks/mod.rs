mod prediction_dump;
mod train_predict;

pub use prediction_dump::{PredictionFormat, export_predictions, write_predictions};
pub use train_predict::{TaskOutcome, TrainPredictTask};

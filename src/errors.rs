use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a delimited data file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file has no header row")]
    Empty,

    #[error("data file has a header but no data rows")]
    NoRows,

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, column '{column}': '{value}' is not a number")]
    NonNumeric {
        line: usize,
        column: String,
        value: String,
    },

    #[error("target column '{0}' not found in header")]
    MissingTarget(String),

    #[error("line {line}: target value is missing")]
    MissingLabel { line: usize },

    #[error("column separator must not be empty")]
    EmptySeparator,
}

/// Errors raised by the train/test splitter.
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("cannot split an empty dataset")]
    Empty,

    #[error("feature rows ({rows}) and target length ({targets}) differ")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("test size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error("split of {n} rows leaves {n_train} train and {n_test} test rows")]
    EmptySide {
        n: usize,
        n_train: usize,
        n_test: usize,
    },
}

/// Errors raised by transformers, classifiers and pipelines.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("{0} must be fitted before use")]
    NotFitted(&'static str),

    #[error("expected {expected} features, got {found}")]
    FeatureCountMismatch { expected: usize, found: usize },

    #[error("input has no rows")]
    EmptyInput,

    #[error("feature rows ({rows}) and target length ({targets}) differ")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("training target has a single class ({0}); at least two are required")]
    SingleClass(f64),

    #[error("invalid hyperparameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Errors raised while cross-validating a pipeline.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("number of folds must be at least 2, got {0}")]
    TooFewFolds(usize),

    #[error("cannot make {n_splits} folds from {n} rows")]
    TooFewRows { n: usize, n_splits: usize },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

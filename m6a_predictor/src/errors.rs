use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by a classifier while scoring an encoded feature table.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Feature `{0}` expected by the model is not present in the feature table")]
    MissingFeature(String),

    #[error("Missing value for feature `{feature}` at row {row}")]
    MissingValue { feature: String, row: usize },

    #[error("Feature `{feature}` has level `{level}` at row {row} which the model was not trained on")]
    UnknownLevel {
        feature: String,
        level: String,
        row: usize,
    },

    #[error("Classifier output has no `{0}` class column")]
    MissingClass(String),

    #[error("Classifier returned {found} probabilities for {expected} rows")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("Classifier returned an invalid probability at row {row}: {value:?}")]
    InvalidProbability { row: usize, value: Option<f64> },

    #[error("Model IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model deserialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Top-level error type for feature preparation and prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Positive threshold must be a finite value in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("DNA sequence at row {row} has length {found}, expected {expected}")]
    SequenceLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Data frame error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PredictResult<T> = Result<T, PredictError>;

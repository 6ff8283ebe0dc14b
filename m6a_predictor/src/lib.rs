//! Feature encoding and random-forest scoring of candidate m6A sites.

pub mod cli;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod helper_functions;
pub mod models;
pub mod prediction_tools;

pub use errors::{ClassifierError, PredictError, PredictResult};
pub use models::{FeatureRecord, M6aStatus, SinglePrediction};
pub use prediction_tools::{predict_batch, predict_single, Classifier, RandomForestClassifier};

use polars::prelude::*;
use tracing::{debug, error, info};

use crate::encoding::{encode_dna_column, restrict_to_domain};
use crate::errors::{ClassifierError, PredictError, PredictResult};
use crate::helper_functions::missing_columns;
use crate::models::{
    M6aStatus, RnaRegion, RnaType, DNA_5MER, NUMERIC_COLUMNS, PREDICTED_PROB, PREDICTED_STATUS,
    REQUIRED_COLUMNS, RNA_REGION, RNA_TYPE,
};
use crate::prediction_tools::classifier::{class_probabilities, Classifier, POSITIVE_CLASS};

pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.5;

pub fn validate_threshold(threshold: f64) -> PredictResult<f64> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(PredictError::InvalidThreshold(threshold))
    }
}

/// Build the table the classifier sees from a raw feature table.
///
/// Numeric columns are cast to `Float64`, `RNA_type` and `RNA_region` are
/// restricted to their domains and the `DNA_5mer` positions are appended as
/// `nt_pos1..nt_posN`, replacing any columns of the same name.
pub fn encode_features(df: &DataFrame) -> PredictResult<DataFrame> {
    let missing = missing_columns(df, &REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(PredictError::MissingColumns(missing));
    }

    let mut encoded = df.clone();

    for &name in NUMERIC_COLUMNS.iter() {
        let cast = df.column(name)?.strict_cast(&DataType::Float64)?;
        encoded.with_column(cast)?;
    }

    encoded.with_column(restrict_to_domain::<RnaType>(df.column(RNA_TYPE)?)?)?;
    encoded.with_column(restrict_to_domain::<RnaRegion>(df.column(RNA_REGION)?)?)?;

    let positions = encode_dna_column(df, DNA_5MER)?;
    debug!("Encoded {} into {} position columns", DNA_5MER, positions.width());
    for position in positions.get_columns() {
        encoded.with_column(position.clone())?;
    }

    Ok(encoded)
}

/// Predict m6A probability and status for every row of `df`.
///
/// Returns a copy of `df` with `predicted_m6A_prob` and
/// `predicted_m6A_status` appended. A row is `Positive` only when its
/// probability is strictly greater than `positive_threshold`.
///
/// # Errors
///
/// * `PredictError::MissingColumns` if any feature column is absent; raised
///   before anything is encoded or scored
/// * `PredictError::Classifier` for whatever the classifier rejects
pub fn predict_batch(
    classifier: &dyn Classifier,
    df: &DataFrame,
    positive_threshold: f64,
) -> PredictResult<DataFrame> {
    let threshold = validate_threshold(positive_threshold)?;

    if !classifier.classes().iter().any(|c| c == POSITIVE_CLASS) {
        error!("Classifier has no `{}` class: {:?}", POSITIVE_CLASS, classifier.classes());
        return Err(ClassifierError::MissingClass(POSITIVE_CLASS.to_string()).into());
    }

    let encoded = encode_features(df).map_err(|e| {
        error!("Failed to prepare features: {}", e);
        e
    })?;

    let probabilities: Vec<f64> = if encoded.height() == 0 {
        info!("Empty feature table, skipping classifier");
        Vec::new()
    } else {
        info!("Scoring {} candidate sites", encoded.height());
        let class_table = classifier.predict_proba(&encoded)?;
        class_probabilities(&class_table, POSITIVE_CLASS, encoded.height())?
    };

    let status: Vec<M6aStatus> = probabilities
        .iter()
        .map(|p| M6aStatus::from_probability(*p, threshold))
        .collect();
    let status_labels: Vec<&str> = status.iter().map(M6aStatus::as_str).collect();

    let mut result = df.clone();
    result.with_column(Series::new(PREDICTED_PROB.into(), probabilities))?;
    result.with_column(Series::new(PREDICTED_STATUS.into(), status_labels))?;

    let positives = status.iter().filter(|s| **s == M6aStatus::Positive).count();
    info!(
        "{} of {} sites called Positive at threshold {}",
        positives,
        result.height(),
        threshold
    );

    Ok(result)
}

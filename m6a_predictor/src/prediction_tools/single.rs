use polars::df;
use polars::prelude::*;
use tracing::debug;

use crate::errors::{ClassifierError, PredictResult};
use crate::models::{
    FeatureRecord, M6aStatus, SinglePrediction, DISTANCE_TO_JUNCTION, DNA_5MER,
    EVOLUTIONARY_CONSERVATION, EXON_LENGTH, GC_CONTENT, PREDICTED_PROB, RNA_REGION, RNA_TYPE,
};
use crate::prediction_tools::batch::predict_batch;
use crate::prediction_tools::classifier::Classifier;

/// One-row feature table with the column names the batch predictor expects.
pub fn record_to_frame(record: &FeatureRecord) -> PolarsResult<DataFrame> {
    df![
        GC_CONTENT => [record.gc_content],
        RNA_TYPE => [record.rna_type.as_str()],
        RNA_REGION => [record.rna_region.as_str()],
        EXON_LENGTH => [record.exon_length],
        DISTANCE_TO_JUNCTION => [record.distance_to_junction],
        EVOLUTIONARY_CONSERVATION => [record.evolutionary_conservation],
        DNA_5MER => [record.dna_5mer.as_str()]
    ]
}

/// Predict a single site by running it through [`predict_batch`] as a
/// one-row table.
pub fn predict_single(
    classifier: &dyn Classifier,
    record: &FeatureRecord,
    positive_threshold: f64,
) -> PredictResult<SinglePrediction> {
    let df = record_to_frame(record)?;
    let result = predict_batch(classifier, &df, positive_threshold)?;

    let probability = result
        .column(PREDICTED_PROB)?
        .f64()?
        .get(0)
        .ok_or(ClassifierError::InvalidProbability { row: 0, value: None })?;
    let status = M6aStatus::from_probability(probability, positive_threshold);

    debug!("Single site {} -> {:.4} ({})", record.dna_5mer, probability, status);

    Ok(SinglePrediction {
        predicted_m6a_prob: probability,
        predicted_m6a_status: status,
    })
}

use std::path::PathBuf;

use m6a_predictor::config::PredictorConfig;
use m6a_predictor::helper_functions::{dataframe_to_csv, read_csv};
use m6a_predictor::models::{FeatureRecord, M6aStatus, PREDICTED_PROB, PREDICTED_STATUS};
use m6a_predictor::{predict_batch, predict_single, ClassifierError, PredictError, RandomForestClassifier};

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn demo_forest() -> RandomForestClassifier {
    RandomForestClassifier::load(&data_path("m6a_forest.json")).expect("demo model should load")
}

#[test]
fn demo_batch_scores_every_site() {
    let forest = demo_forest();
    let df = read_csv(&data_path("sample_sites.csv")).unwrap();

    let out = predict_batch(&forest, &df, 0.5).unwrap();

    assert_eq!(out.height(), df.height());
    let probs: Vec<f64> = out.column(PREDICTED_PROB).unwrap().f64().unwrap().into_no_null_iter().collect();
    let expected = [0.7875, 0.175, 0.725, 0.375];
    for (p, e) in probs.iter().zip(expected) {
        assert!((p - e).abs() < 1e-9, "got {p}, expected {e}");
    }

    let status: Vec<&str> = out.column(PREDICTED_STATUS).unwrap().str().unwrap().into_no_null_iter().collect();
    assert_eq!(status, vec!["Positive", "Negative", "Positive", "Negative"]);
}

#[test]
fn single_site_agrees_with_batch_row() {
    let forest = demo_forest();
    let record = FeatureRecord {
        gc_content: 0.52,
        rna_type: "mRNA".to_string(),
        rna_region: "CDS".to_string(),
        exon_length: 180.0,
        distance_to_junction: 45.0,
        evolutionary_conservation: 0.81,
        dna_5mer: "GGACA".to_string(),
    };

    let single = predict_single(&forest, &record, 0.5).unwrap();

    assert!((single.predicted_m6a_prob - 0.7875).abs() < 1e-9);
    assert_eq!(single.predicted_m6a_status, M6aStatus::Positive);

    // Raising the threshold above the probability flips the call
    let strict = predict_single(&forest, &record, 0.8).unwrap();
    assert_eq!(strict.predicted_m6a_status, M6aStatus::Negative);
}

#[test]
fn unmapped_rna_type_is_rejected_by_the_forest() {
    let forest = demo_forest();
    let mut df = read_csv(&data_path("sample_sites.csv")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.csv");
    dataframe_to_csv(&mut df, &path, true).unwrap();

    let text = std::fs::read_to_string(&path).unwrap().replace("lncRNA", "snoRNA");
    std::fs::write(&path, text).unwrap();
    let df = read_csv(&path).unwrap();

    match predict_batch(&forest, &df, 0.5) {
        Err(PredictError::Classifier(ClassifierError::MissingValue { feature, row })) => {
            assert_eq!(feature, "RNA_type");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn bundled_config_points_at_demo_model() {
    let config = PredictorConfig::load(&data_path("config.json")).unwrap();
    assert_eq!(config, PredictorConfig::default());
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use m6a_predictor::cli::{Args, ModelArgs, SubArgs};
use m6a_predictor::config::PredictorConfig;
use m6a_predictor::helper_functions::{dataframe_to_csv, read_csv, resolve_path};
use m6a_predictor::prediction_tools::batch::validate_threshold;
use m6a_predictor::{predict_batch, predict_single, RandomForestClassifier};

// CLI overrides win over the config file
fn model_and_threshold(config: &PredictorConfig, overrides: &ModelArgs) -> Result<(PathBuf, f64)> {
    let model_path = match &overrides.model {
        Some(path) => resolve_path(path),
        None => config.model_path(),
    };
    let threshold = validate_threshold(overrides.threshold.unwrap_or(config.positive_threshold))?;
    Ok((model_path, threshold))
}

fn load_forest(path: &Path) -> Result<RandomForestClassifier> {
    RandomForestClassifier::load(path)
        .with_context(|| format!("failed to load model from {}", path.display()))
}

fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = PredictorConfig::load_or_default(args.config.as_deref())
        .context("failed to read configuration")?;

    match args.command {
        SubArgs::Batch { args } => {
            let (model_path, threshold) = model_and_threshold(&config, &args.model)?;
            let forest = load_forest(&model_path)?;

            let input = resolve_path(&args.input);
            info!("Reading candidate sites from {}", input.display());
            let df = read_csv(&input).with_context(|| format!("failed to read {}", input.display()))?;

            let mut result = predict_batch(&forest, &df, threshold).map_err(|e| {
                error!("Batch prediction failed: {}", e);
                e
            })?;

            let output = match &args.output {
                Some(path) => resolve_path(path),
                None => config.default_output_for(&args.input),
            };
            dataframe_to_csv(&mut result, &output, true)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("Predictions saved to {}", output.display());
        }
        SubArgs::Single { args } => {
            let (model_path, threshold) = model_and_threshold(&config, &args.model)?;
            let forest = load_forest(&model_path)?;

            let prediction = predict_single(&forest, &args.record(), threshold)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        SubArgs::Inspect { model } => {
            let (model_path, _) = model_and_threshold(&config, &model)?;
            let forest = load_forest(&model_path)?;
            println!("{}", forest.describe());
        }
    }

    Ok(())
}

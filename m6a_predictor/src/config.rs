use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{PredictError, PredictResult};
use crate::helper_functions::resolve_path;
use crate::prediction_tools::batch::{validate_threshold, DEFAULT_POSITIVE_THRESHOLD};

/// Settings shared by the CLI subcommands, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Serialized random forest.
    pub model_path: PathBuf,
    pub positive_threshold: f64,
    /// Where batch results go when no output path is given.
    pub output_dir: PathBuf,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("data/m6a_forest.json"),
            positive_threshold: DEFAULT_POSITIVE_THRESHOLD,
            output_dir: PathBuf::from("prediction_results"),
        }
    }
}

impl PredictorConfig {
    pub fn load(path: &Path) -> PredictResult<Self> {
        info!("Reading configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        let config: PredictorConfig = serde_json::from_str(&text)
            .map_err(|e| PredictError::Config(format!("{}: {}", path.display(), e)))?;
        config.validated()
    }

    pub fn load_or_default(path: Option<&Path>) -> PredictResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validated(self) -> PredictResult<Self> {
        validate_threshold(self.positive_threshold)?;
        Ok(self)
    }

    /// Model path anchored at the project root.
    pub fn model_path(&self) -> PathBuf {
        resolve_path(&self.model_path)
    }

    pub fn output_dir(&self) -> PathBuf {
        resolve_path(&self.output_dir)
    }

    /// `<output_dir>/<input stem>_predictions.csv`
    pub fn default_output_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "features".to_string());
        self.output_dir().join(format!("{}_predictions.csv", stem))
    }
}

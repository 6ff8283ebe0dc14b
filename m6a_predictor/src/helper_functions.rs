use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Anchor relative paths at the project root, leave absolute ones untouched.
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root().join(path)
    }
}

pub fn read_csv(file_path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()
}

pub fn dataframe_to_csv(df: &mut DataFrame, file_path: &Path, include_header: bool) -> PolarsResult<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(file_path)?;
    CsvWriter::new(&mut file)
        .include_header(include_header)
        .with_separator(b',')
        .finish(df)?;

    info!("Wrote {} rows to {}", df.height(), file_path.display());
    Ok(())
}

/// Names from `required` that the frame does not carry, in the given order.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let schema = df.schema();
    required
        .iter()
        .filter(|name| !schema.contains(**name))
        .map(|name| name.to_string())
        .collect()
}

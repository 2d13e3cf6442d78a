pub mod generate;
pub mod init;
pub mod query;
pub mod report;
pub mod serve;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use gradelens_core::dataset::Dataset;
use gradelens_core::loader;

/// How query results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// `--data` if given, otherwise `data_path` from the loaded config.
pub fn resolve_data_path(data: Option<PathBuf>) -> Result<PathBuf> {
    match data {
        Some(path) => Ok(path),
        None => Ok(gradelens_server::load_config()?.data_path),
    }
}

/// Load and validate a grades CSV into a dataset.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let records = loader::load_grades(path)?;
    let dataset = Dataset::new(records)
        .with_context(|| format!("invalid grades in {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        students = dataset.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

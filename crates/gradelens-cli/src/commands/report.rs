//! The `gradelens report` command.

use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;

use gradelens_core::report::AnalyticsReport;

use super::{load_dataset, print_json, resolve_data_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

pub fn execute(data: Option<PathBuf>, output: Option<PathBuf>, format: ReportFormat) -> Result<()> {
    let path = resolve_data_path(data)?;
    let dataset = load_dataset(&path)?;
    let report = AnalyticsReport::build(&dataset)?;

    if let Some(output) = &output {
        report.save_json(output)?;
        eprintln!("Report saved to {}", output.display());
    }

    match format {
        ReportFormat::Markdown => print!("{}", report.to_markdown()),
        ReportFormat::Json => print_json(&report)?,
    }
    Ok(())
}

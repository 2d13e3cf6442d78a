//! The `gradelens validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradelens_core::loader::validate_dataset;

use super::{load_dataset, resolve_data_path};

pub fn execute(data: Option<PathBuf>) -> Result<()> {
    let path = resolve_data_path(data)?;
    let dataset = load_dataset(&path)?;
    println!("{}: {} students", path.display(), dataset.len());

    let warnings = validate_dataset(&dataset);
    for w in &warnings {
        let prefix = w
            .item
            .map(|item| format!("  [{}]", item.label()))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Dataset valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}

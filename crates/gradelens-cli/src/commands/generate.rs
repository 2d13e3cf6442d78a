//! The `gradelens generate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradelens_core::generator::{generate, SyntheticConfig};
use gradelens_core::loader::write_grades;

pub fn execute(output: PathBuf, students: u32, seed: u64) -> Result<()> {
    let config = SyntheticConfig {
        students,
        seed,
        ..SyntheticConfig::default()
    };
    let records = generate(&config)?;
    write_grades(&output, &records)?;
    println!(
        "Wrote {} students to {} (seed {seed})",
        records.len(),
        output.display()
    );
    Ok(())
}

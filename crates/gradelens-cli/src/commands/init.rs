//! The `gradelens init` command.

use std::path::Path;

use anyhow::Result;

use gradelens_server::GradelensConfig;

pub fn execute() -> Result<()> {
    if Path::new("gradelens.toml").exists() {
        println!("gradelens.toml already exists, skipping.");
    } else {
        std::fs::write("gradelens.toml", GradelensConfig::sample_toml())?;
        println!("Created gradelens.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: gradelens generate --output grades.csv");
    println!("  2. Run: gradelens validate --data grades.csv");
    println!("  3. Run: gradelens serve");

    Ok(())
}

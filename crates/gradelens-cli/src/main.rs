//! gradelens CLI — serve the analytics API or query a grades file directly.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "gradelens", version, about = "Grade analytics for 10-item binary tests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Grades CSV (overrides the config file)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Descriptive statistics of total scores and item difficulty
    Stats {
        /// Grades CSV (defaults to data_path from the config)
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Item correlation matrix
    Correlation {
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// P(target correct | given correct)
    Conditional {
        /// Conditioning item (1-10)
        #[arg(long)]
        given: String,

        /// Target item (1-10)
        #[arg(long)]
        target: String,

        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// P(total >= threshold | item outcome)
    Bayes {
        /// Observed item (q1-q10)
        #[arg(long)]
        condition: String,

        /// Observed outcome (0 or 1)
        #[arg(long)]
        value: String,

        /// Score threshold (0-10)
        #[arg(long)]
        threshold: String,

        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate a grades CSV and report degenerate items
    Validate {
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Write a synthetic grades CSV
    Generate {
        /// Output CSV path
        #[arg(long, default_value = "grades.csv")]
        output: PathBuf,

        /// Number of students
        #[arg(long, default_value = "100")]
        students: u32,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Build a full analytics report
    Report {
        #[arg(long)]
        data: Option<PathBuf>,

        /// Also save the report as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print as markdown or JSON
        #[arg(long, value_enum, default_value_t = commands::report::ReportFormat::Markdown)]
        format: commands::report::ReportFormat,
    },

    /// Create a starter gradelens.toml
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "gradelens=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, data, port } => commands::serve::execute(config, data, port).await,
        Commands::Stats { data, format } => commands::query::stats(data, format),
        Commands::Correlation { data, format } => commands::query::correlation(data, format),
        Commands::Conditional {
            given,
            target,
            data,
            format,
        } => commands::query::conditional(given, target, data, format),
        Commands::Bayes {
            condition,
            value,
            threshold,
            data,
            format,
        } => commands::query::bayes(condition, value, threshold, data, format),
        Commands::Validate { data } => commands::validate::execute(data),
        Commands::Generate {
            output,
            students,
            seed,
        } => commands::generate::execute(output, students, seed),
        Commands::Report {
            data,
            output,
            format,
        } => commands::report::execute(data, output, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

//! The `gradelens stats|correlation|conditional|bayes` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradelens_core::bayes::{BayesQuery, BayesUpdate};
use gradelens_core::conditional::{ConditionalProbability, ConditionalQuery};
use gradelens_core::correlation::CorrelationMatrix;
use gradelens_core::query::{
    execute, AnalyticsQuery, AnalyticsResponse, BayesParams, ConditionalParams,
};
use gradelens_core::statistics::DescriptiveStats;

use super::{load_dataset, print_json, resolve_data_path, OutputFormat};

fn run(data: Option<PathBuf>, query: AnalyticsQuery, format: OutputFormat) -> Result<()> {
    let path = resolve_data_path(data)?;
    let dataset = load_dataset(&path)?;
    let response = execute(&dataset, &query)?;

    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            match &response {
                AnalyticsResponse::Statistics(s) => print_statistics(s),
                AnalyticsResponse::CorrelationMatrix(m) => print_correlation(m),
                AnalyticsResponse::Conditional(c) => print_conditional(c),
                AnalyticsResponse::Bayes(u) => print_bayes(u),
                AnalyticsResponse::Grades(rows) => println!("{} students", rows.len()),
            }
            Ok(())
        }
    }
}

pub fn stats(data: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    run(data, AnalyticsQuery::Statistics, format)
}

pub fn correlation(data: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    run(data, AnalyticsQuery::CorrelationMatrix, format)
}

pub fn conditional(
    given: String,
    target: String,
    data: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    // Validate before touching the data file.
    let query = ConditionalQuery::from_params(&ConditionalParams {
        given: Some(given),
        target: Some(target),
    })?;
    run(data, AnalyticsQuery::Conditional(query), format)
}

pub fn bayes(
    condition: String,
    value: String,
    threshold: String,
    data: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let query = BayesQuery::from_params(&BayesParams {
        condition: Some(condition),
        value: Some(value),
        threshold: Some(threshold),
    })?;
    run(data, AnalyticsQuery::Bayes(query), format)
}

fn print_statistics(s: &DescriptiveStats) {
    let mut table = Table::new();
    table.set_header(vec!["Students", "Mean", "Median", "Std Dev", "Min", "Max"]);
    table.add_row(vec![
        Cell::new(s.student_count),
        Cell::new(format!("{:.2}", s.mean)),
        Cell::new(format!("{:.1}", s.median)),
        Cell::new(format!("{:.2}", s.std_dev)),
        Cell::new(s.min),
        Cell::new(s.max),
    ]);
    println!("{table}");

    let mut items = Table::new();
    items.set_header(vec!["Item", "Correct %"]);
    for (item, p) in &s.question_stats {
        items.add_row(vec![
            Cell::new(item.label()),
            Cell::new(format!("{:.1}%", p * 100.0)),
        ]);
    }
    println!("{items}");
}

fn print_correlation(m: &CorrelationMatrix) {
    let mut table = Table::new();
    let mut header = vec![String::new()];
    header.extend(m.question_labels.iter().cloned());
    table.set_header(header);

    for (label, row) in m.question_labels.iter().zip(&m.matrix) {
        let mut cells = vec![Cell::new(label)];
        cells.extend(row.iter().map(|r| Cell::new(format!("{r:.2}"))));
        table.add_row(cells);
    }
    println!("{table}");

    if !m.degenerate_items.is_empty() {
        println!(
            "Zero-variance items (reported as 0): {}",
            m.degenerate_items.join(", ")
        );
    }
}

fn print_conditional(c: &ConditionalProbability) {
    println!(
        "P(Q{} correct | Q{} correct) = {:.4}  ({} of {} students)",
        c.target_question,
        c.given_question,
        c.probability,
        c.both_correct_count,
        c.given_correct_count
    );
}

fn print_bayes(u: &BayesUpdate) {
    let mut table = Table::new();
    table.set_header(vec!["Quantity", "Value"]);
    let t = u.threshold.value();
    let b = format!("{} = {}", u.condition.label(), u.condition_value);
    table.add_row(vec![
        Cell::new(format!("Prior P(total >= {t})")),
        Cell::new(format!("{:.4}", u.prior_probability)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Likelihood P({b} | total >= {t})")),
        Cell::new(format!("{:.4}", u.likelihood_probability)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Evidence P({b})")),
        Cell::new(format!("{:.4}", u.evidence_probability)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Posterior P(total >= {t} | {b})")),
        Cell::new(format!("{:.4}", u.posterior_probability)),
    ]);
    println!("{table}");
    println!(
        "{} students with {b}, {} reached {t}, {} both",
        u.condition_met_count, u.threshold_met_count, u.both_conditions_met_count
    );
}

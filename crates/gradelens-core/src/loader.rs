//! Grades CSV loader and dataset validation.
//!
//! Expected layout: a header row with `Q1`..`Q10` and `Total` columns
//! (case-insensitive, any order), optionally a `student_id` column. Without
//! one, students are numbered `1..=n` in row order.

use std::path::Path;

use anyhow::{Context, Result};

use crate::dataset::Dataset;
use crate::model::{ItemIndex, StudentRecord, ITEM_COUNT};

struct ColumnMap {
    student_id: Option<usize>,
    items: [usize; ITEM_COUNT],
    total: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let mut items = [0usize; ITEM_COUNT];
        for item in ItemIndex::all() {
            items[item.offset()] = find(item.label().as_str())
                .with_context(|| format!("missing column '{}'", item.label()))?;
        }
        let total = find("total").context("missing column 'Total'")?;
        let student_id = find("student_id").or_else(|| find("id"));

        Ok(Self {
            student_id,
            items,
            total,
        })
    }
}

fn cell(row: &csv::StringRecord, index: usize, column: &str) -> Result<i64> {
    let raw = row
        .get(index)
        .with_context(|| format!("missing value for '{column}'"))?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("'{raw}' in column '{column}' is not an integer"))
}

/// Load a grades CSV file.
pub fn load_grades(path: &Path) -> Result<Vec<StudentRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grades file: {}", path.display()))?;

    parse_grades_str(&content, path)
}

/// Parse grades CSV content. `source_path` is only used in error messages.
///
/// The first bad row aborts the whole load.
pub fn parse_grades_str(content: &str, source_path: &Path) -> Result<Vec<StudentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read CSV header: {}", source_path.display()))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)
        .with_context(|| format!("bad CSV header in {}", source_path.display()))?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = row.with_context(|| format!("{}: malformed line {line}", source_path.display()))?;

        let parse_row = || -> Result<StudentRecord> {
            let student_id = match columns.student_id {
                Some(idx) => {
                    let id = cell(&row, idx, "student_id")?;
                    u32::try_from(id).with_context(|| format!("invalid student_id {id}"))?
                }
                None => u32::try_from(i + 1).context("too many rows")?,
            };
            let mut responses = [0i64; ITEM_COUNT];
            for item in ItemIndex::all() {
                responses[item.offset()] =
                    cell(&row, columns.items[item.offset()], &item.label())?;
            }
            let total = cell(&row, columns.total, "Total")?;
            Ok(StudentRecord::from_raw(student_id, &responses, total)?)
        };

        let record =
            parse_row().with_context(|| format!("{}: line {line}", source_path.display()))?;
        records.push(record);
    }

    tracing::debug!(
        rows = records.len(),
        source = %source_path.display(),
        "parsed grades CSV"
    );
    Ok(records)
}

/// Render records as CSV with a `student_id` column.
pub fn grades_to_csv(records: &[StudentRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["student_id".to_string()];
    header.extend(ItemIndex::all().map(ItemIndex::label));
    header.push("Total".to_string());
    writer.write_record(&header)?;

    for r in records {
        let mut row = vec![r.student_id.to_string()];
        row.extend(r.responses.iter().map(|o| o.as_u8().to_string()));
        row.push(r.total.to_string());
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Write records to a CSV file, creating parent directories.
pub fn write_grades(path: &Path, records: &[StudentRecord]) -> Result<()> {
    let csv = grades_to_csv(records)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write grades to {}", path.display()))
}

/// A warning from dataset validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item concerned (if applicable).
    pub item: Option<ItemIndex>,
    /// Warning message.
    pub message: String,
}

/// Check a dataset for conditions that make some queries undefined.
pub fn validate_dataset(dataset: &Dataset) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if dataset.is_empty() {
        warnings.push(ValidationWarning {
            item: None,
            message: "dataset is empty; every statistic is undefined".into(),
        });
        return warnings;
    }

    let n = dataset.len();
    for item in ItemIndex::all() {
        let correct = dataset.count_where(|r| r.is_correct(item));
        if correct == 0 {
            warnings.push(ValidationWarning {
                item: Some(item),
                message: format!(
                    "no student answered {} correctly; conditional probabilities given it are undefined",
                    item.label()
                ),
            });
        }
        if correct == 0 || correct == n {
            warnings.push(ValidationWarning {
                item: Some(item),
                message: format!(
                    "{} has zero variance; its correlations are reported as 0",
                    item.label()
                ),
            });
        }
    }

    warnings
}

//! Analytics report with JSON persistence and a markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correlation::{correlation_matrix, CorrelationMatrix};
use crate::dataset::Dataset;
use crate::statistics::{describe, DescriptiveStats};

/// Statistics and correlations for one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Snapshot the figures were computed from.
    pub snapshot_id: Uuid,
    pub student_count: usize,
    pub statistics: DescriptiveStats,
    pub correlation: CorrelationMatrix,
}

impl AnalyticsReport {
    /// Compute a report. Fails on an empty dataset.
    pub fn build(dataset: &Dataset) -> Result<Self> {
        let statistics = describe(dataset)?;
        let correlation = correlation_matrix(dataset)?;
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            snapshot_id: dataset.snapshot_id(),
            student_count: dataset.len(),
            statistics,
            correlation,
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse report JSON")
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let s = &self.statistics;
        let mut md = String::new();

        md.push_str("# Grade Analytics Report\n\n");
        md.push_str(&format!(
            "**Snapshot:** `{}`  \n**Generated:** {}  \n**Students:** {}\n\n",
            self.snapshot_id,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.student_count
        ));

        md.push_str("## Total Scores\n\n");
        md.push_str("| Mean | Median | Std Dev | Min | Max |\n");
        md.push_str("|------|--------|---------|-----|-----|\n");
        md.push_str(&format!(
            "| {:.2} | {:.1} | {:.2} | {} | {} |\n\n",
            s.mean, s.median, s.std_dev, s.min, s.max
        ));

        md.push_str("## Items\n\n");
        md.push_str("| Item | Proportion Correct |\n");
        md.push_str("|------|--------------------|\n");
        for (item, p) in &s.question_stats {
            md.push_str(&format!("| {} | {:.1}% |\n", item.label(), p * 100.0));
        }
        md.push('\n');

        md.push_str("## Score Distribution\n\n");
        md.push_str("| Score | Students |\n");
        md.push_str("|-------|----------|\n");
        for bucket in s.score_distribution.iter().filter(|b| b.count > 0) {
            md.push_str(&format!("| {} | {} |\n", bucket.score, bucket.count));
        }
        md.push('\n');

        md.push_str("## Item Correlations\n\n");
        md.push_str("| |");
        for label in &self.correlation.question_labels {
            md.push_str(&format!(" {label} |"));
        }
        md.push_str("\n|---|");
        md.push_str(&"---|".repeat(self.correlation.question_labels.len()));
        md.push('\n');
        for (label, row) in self
            .correlation
            .question_labels
            .iter()
            .zip(&self.correlation.matrix)
        {
            md.push_str(&format!("| {label} |"));
            for r in row {
                md.push_str(&format!(" {r:.2} |"));
            }
            md.push('\n');
        }

        if !self.correlation.degenerate_items.is_empty() {
            md.push_str(&format!(
                "\nZero-variance items (correlations reported as 0): {}\n",
                self.correlation.degenerate_items.join(", ")
            ));
        }

        md
    }
}

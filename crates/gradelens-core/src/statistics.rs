//! Descriptive statistics over total scores and per-item correct rates.
//!
//! Standard deviation is the **population** standard deviation (divide by
//! `n`): the dataset is the whole cohort that sat the test, not a sample.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::model::{ItemIndex, MAX_TOTAL};

/// Summary of a dataset's total scores and item difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Arithmetic mean of totals.
    pub mean: f64,
    /// Middle total; mean of the two central totals when `n` is even.
    pub median: f64,
    /// Population standard deviation of totals.
    pub std_dev: f64,
    /// Lowest total.
    pub min: u8,
    /// Highest total.
    pub max: u8,
    /// Number of students.
    pub student_count: usize,
    /// Correct rate per item, keyed `q1`..`q10`.
    pub question_stats: BTreeMap<ItemIndex, f64>,
    /// Number of students at each total from 0 to 10.
    pub score_distribution: Vec<ScoreBucket>,
}

/// Count of students with one particular total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub score: u8,
    pub count: usize,
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the values. `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation (two-pass). `None` for an empty slice.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((sum_sq / values.len() as f64).sqrt())
}

/// Compute descriptive statistics for a dataset.
pub fn describe(dataset: &Dataset) -> Result<DescriptiveStats> {
    let n = dataset.require_records()?;
    let totals = dataset.totals();
    let as_f64: Vec<f64> = totals.iter().copied().map(f64::from).collect();

    let mean = mean(&as_f64).ok_or(AnalyticsError::EmptyDataset)?;
    let median = median(&as_f64).ok_or(AnalyticsError::EmptyDataset)?;
    let std_dev = population_std_dev(&as_f64).ok_or(AnalyticsError::EmptyDataset)?;
    let min = totals.iter().copied().min().ok_or(AnalyticsError::EmptyDataset)?;
    let max = totals.iter().copied().max().ok_or(AnalyticsError::EmptyDataset)?;

    let question_stats = ItemIndex::all()
        .map(|item| {
            let correct = dataset.count_where(|r| r.is_correct(item));
            (item, correct as f64 / n as f64)
        })
        .collect();

    let mut counts = [0usize; MAX_TOTAL as usize + 1];
    for t in &totals {
        counts[usize::from(*t)] += 1;
    }
    let score_distribution = counts
        .iter()
        .enumerate()
        .map(|(score, &count)| ScoreBucket {
            score: score as u8,
            count,
        })
        .collect();

    tracing::debug!(students = n, mean, std_dev, "computed descriptive statistics");

    Ok(DescriptiveStats {
        mean,
        median,
        std_dev,
        min,
        max,
        student_count: n,
        question_stats,
        score_distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{record_from_bits, ITEM_COUNT};

    fn item(n: u8) -> ItemIndex {
        ItemIndex::new(n).unwrap()
    }

    fn two_students() -> Dataset {
        Dataset::new(vec![
            record_from_bits(1, [1, 1, 1, 1, 1, 1, 1, 1, 1, 1]).unwrap(),
            record_from_bits(2, [1, 1, 1, 1, 1, 1, 1, 0, 0, 0]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn two_student_example() {
        let stats = describe(&two_students()).unwrap();
        assert!((stats.mean - 8.5).abs() < f64::EPSILON);
        assert!((stats.median - 8.5).abs() < f64::EPSILON);
        assert!((stats.std_dev - 1.5).abs() < 1e-12);
        assert_eq!(stats.min, 7);
        assert_eq!(stats.max, 10);
        assert_eq!(stats.student_count, 2);
        for n in 1..=7 {
            assert_eq!(stats.question_stats[&item(n)], 1.0);
        }
        for n in 8..=10 {
            assert_eq!(stats.question_stats[&item(n)], 0.5);
        }
    }

    #[test]
    fn three_student_fixture() {
        let ds = Dataset::new(vec![
            record_from_bits(1, [1; ITEM_COUNT]).unwrap(),
            record_from_bits(2, [1, 1, 1, 1, 1, 1, 1, 0, 0, 0]).unwrap(),
            record_from_bits(3, [0; ITEM_COUNT]).unwrap(),
        ])
        .unwrap();
        let stats = describe(&ds).unwrap();
        assert!((stats.mean - 17.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 10);
        assert_eq!(stats.question_stats.len(), 10);
        assert!((stats.question_stats[&item(1)] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn score_distribution_covers_every_total() {
        let stats = describe(&two_students()).unwrap();
        assert_eq!(stats.score_distribution.len(), 11);
        assert_eq!(stats.score_distribution[7], ScoreBucket { score: 7, count: 1 });
        assert_eq!(stats.score_distribution[10].count, 1);
        let total: usize = stats.score_distribution.iter().map(|b| b.count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn question_stats_serialize_with_item_keys() {
        let stats = describe(&two_students()).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["question_stats"]["q1"], 1.0);
        assert_eq!(json["question_stats"]["q10"], 0.5);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert_eq!(describe(&Dataset::empty()), Err(AnalyticsError::EmptyDataset));
    }

    #[test]
    fn slice_helpers() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(population_std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
        let sd = population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }
}

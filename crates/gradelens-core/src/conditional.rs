//! P(target item correct | given item correct).

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::model::ItemIndex;

/// A validated conditional-probability request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalQuery {
    pub given: ItemIndex,
    pub target: ItemIndex,
}

/// Counts and probability for one (given, target) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalProbability {
    pub given_question: u8,
    pub target_question: u8,
    pub given_correct_count: usize,
    pub both_correct_count: usize,
    pub probability: f64,
}

/// Compute P(target = 1 | given = 1).
///
/// Fails with `UndefinedResult` when nobody answered `given` correctly.
pub fn conditional_probability(
    dataset: &Dataset,
    query: &ConditionalQuery,
) -> Result<ConditionalProbability> {
    dataset.require_records()?;
    let ConditionalQuery { given, target } = *query;

    let mut given_correct_count = 0usize;
    let mut both_correct_count = 0usize;
    for record in dataset.records() {
        if record.is_correct(given) {
            given_correct_count += 1;
            if record.is_correct(target) {
                both_correct_count += 1;
            }
        }
    }

    if given_correct_count == 0 {
        return Err(AnalyticsError::UndefinedResult(format!(
            "no student answered {} correctly, so P({} | {}) is undefined",
            given.label(),
            target.label(),
            given.label()
        )));
    }

    Ok(ConditionalProbability {
        given_question: given.number(),
        target_question: target.number(),
        given_correct_count,
        both_correct_count,
        probability: both_correct_count as f64 / given_correct_count as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{record_from_bits, ITEM_COUNT};

    fn query(given: u8, target: u8) -> ConditionalQuery {
        ConditionalQuery {
            given: ItemIndex::new(given).unwrap(),
            target: ItemIndex::new(target).unwrap(),
        }
    }

    fn two_students() -> Dataset {
        Dataset::new(vec![
            record_from_bits(1, [1; ITEM_COUNT]).unwrap(),
            record_from_bits(2, [1, 1, 1, 1, 1, 1, 1, 0, 0, 0]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn given_q8_target_q1() {
        let result = conditional_probability(&two_students(), &query(8, 1)).unwrap();
        assert_eq!(result.given_question, 8);
        assert_eq!(result.target_question, 1);
        assert_eq!(result.given_correct_count, 1);
        assert_eq!(result.both_correct_count, 1);
        assert_eq!(result.probability, 1.0);
    }

    #[test]
    fn given_q1_target_q8_is_half() {
        let result = conditional_probability(&two_students(), &query(1, 8)).unwrap();
        assert_eq!(result.given_correct_count, 2);
        assert_eq!(result.both_correct_count, 1);
        assert_eq!(result.probability, 0.5);
    }

    #[test]
    fn same_item_is_certain() {
        for n in 1..=10 {
            let result = conditional_probability(&two_students(), &query(n, n)).unwrap();
            assert_eq!(result.probability, 1.0);
        }
    }

    #[test]
    fn nobody_correct_on_given_is_undefined() {
        let ds = Dataset::new(vec![
            record_from_bits(1, [1, 1, 1, 1, 1, 1, 1, 1, 1, 0]).unwrap(),
            record_from_bits(2, [0; ITEM_COUNT]).unwrap(),
        ])
        .unwrap();
        let err = conditional_probability(&ds, &query(10, 1)).unwrap_err();
        assert!(matches!(err, AnalyticsError::UndefinedResult(_)));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert_eq!(
            conditional_probability(&Dataset::empty(), &query(1, 2)),
            Err(AnalyticsError::EmptyDataset)
        );
    }
}

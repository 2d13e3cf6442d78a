//! Typed query requests and dispatch.
//!
//! Transport layers hand over raw string parameters ([`ConditionalParams`],
//! [`BayesParams`]); `from_params` turns them into validated queries or an
//! `InvalidParameter` error before any counting happens.

use serde::{Deserialize, Serialize};

use crate::bayes::{bayes_update, BayesQuery, BayesUpdate};
use crate::conditional::{conditional_probability, ConditionalProbability, ConditionalQuery};
use crate::correlation::{correlation_matrix, CorrelationMatrix};
use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::model::{ItemIndex, Outcome, StudentRecord, Threshold};
use crate::statistics::{describe, DescriptiveStats};

/// Raw `conditional-probability` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionalParams {
    pub given: Option<String>,
    pub target: Option<String>,
}

/// Raw `bayes` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BayesParams {
    pub condition: Option<String>,
    pub value: Option<String>,
    pub threshold: Option<String>,
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AnalyticsError::invalid(name, "missing parameter")),
    }
}

impl ConditionalQuery {
    /// `given` and `target` are item numbers 1-10 (`q`-prefixed also accepted).
    pub fn from_params(params: &ConditionalParams) -> Result<Self> {
        Ok(Self {
            given: ItemIndex::parse_named("given", required("given", &params.given)?)?,
            target: ItemIndex::parse_named("target", required("target", &params.target)?)?,
        })
    }
}

impl BayesQuery {
    /// `condition` is `q1`-`q10` (a bare number is also accepted), `value`
    /// is 0 or 1, `threshold` is 0-10.
    pub fn from_params(params: &BayesParams) -> Result<Self> {
        Ok(Self {
            condition: ItemIndex::parse_named(
                "condition",
                required("condition", &params.condition)?,
            )?,
            value: Outcome::parse_named("value", required("value", &params.value)?)?,
            threshold: Threshold::parse_named("threshold", required("threshold", &params.threshold)?)?,
        })
    }
}

/// The closed set of questions the engine answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsQuery {
    Grades,
    Statistics,
    CorrelationMatrix,
    Conditional(ConditionalQuery),
    Bayes(BayesQuery),
}

/// Result of an [`AnalyticsQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalyticsResponse {
    Grades(Vec<StudentRecord>),
    Statistics(DescriptiveStats),
    CorrelationMatrix(CorrelationMatrix),
    Conditional(ConditionalProbability),
    Bayes(BayesUpdate),
}

/// Answer one query against one snapshot.
pub fn execute(dataset: &Dataset, query: &AnalyticsQuery) -> Result<AnalyticsResponse> {
    match query {
        AnalyticsQuery::Grades => Ok(AnalyticsResponse::Grades(
            dataset.records().cloned().collect(),
        )),
        AnalyticsQuery::Statistics => describe(dataset).map(AnalyticsResponse::Statistics),
        AnalyticsQuery::CorrelationMatrix => {
            correlation_matrix(dataset).map(AnalyticsResponse::CorrelationMatrix)
        }
        AnalyticsQuery::Conditional(q) => {
            conditional_probability(dataset, q).map(AnalyticsResponse::Conditional)
        }
        AnalyticsQuery::Bayes(q) => bayes_update(dataset, q).map(AnalyticsResponse::Bayes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{record_from_bits, ITEM_COUNT};

    fn params(given: Option<&str>, target: Option<&str>) -> ConditionalParams {
        ConditionalParams {
            given: given.map(String::from),
            target: target.map(String::from),
        }
    }

    fn bayes_params(c: &str, v: &str, t: &str) -> BayesParams {
        BayesParams {
            condition: Some(c.into()),
            value: Some(v.into()),
            threshold: Some(t.into()),
        }
    }

    fn param_name(err: AnalyticsError) -> String {
        match err {
            AnalyticsError::InvalidParameter { name, .. } => name,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn conditional_params_validate() {
        let q = ConditionalQuery::from_params(&params(Some("8"), Some("1"))).unwrap();
        assert_eq!(q.given.number(), 8);
        assert_eq!(q.target.number(), 1);

        let missing = ConditionalQuery::from_params(&params(None, Some("1"))).unwrap_err();
        assert_eq!(param_name(missing), "given");
        let blank = ConditionalQuery::from_params(&params(Some("2"), Some(" "))).unwrap_err();
        assert_eq!(param_name(blank), "target");
        let range = ConditionalQuery::from_params(&params(Some("11"), Some("1"))).unwrap_err();
        assert_eq!(param_name(range), "given");
        let typed = ConditionalQuery::from_params(&params(Some("1"), Some("abc"))).unwrap_err();
        assert_eq!(param_name(typed), "target");
    }

    #[test]
    fn bayes_params_validate() {
        let q = BayesQuery::from_params(&bayes_params("q8", "1", "8")).unwrap();
        assert_eq!(q.condition.number(), 8);
        assert_eq!(q.value, Outcome::Correct);
        assert_eq!(q.threshold.value(), 8);

        assert_eq!(
            param_name(BayesQuery::from_params(&bayes_params("q0", "1", "8")).unwrap_err()),
            "condition"
        );
        assert_eq!(
            param_name(BayesQuery::from_params(&bayes_params("q3", "2", "8")).unwrap_err()),
            "value"
        );
        assert_eq!(
            param_name(BayesQuery::from_params(&bayes_params("q3", "0", "11")).unwrap_err()),
            "threshold"
        );
        assert_eq!(
            param_name(BayesQuery::from_params(&BayesParams::default()).unwrap_err()),
            "condition"
        );
    }

    #[test]
    fn execute_dispatches_each_query() {
        let ds = Dataset::new(vec![
            record_from_bits(1, [1; ITEM_COUNT]).unwrap(),
            record_from_bits(2, [1, 1, 1, 1, 1, 1, 1, 0, 0, 0]).unwrap(),
        ])
        .unwrap();

        match execute(&ds, &AnalyticsQuery::Grades).unwrap() {
            AnalyticsResponse::Grades(rows) => assert_eq!(rows.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            execute(&ds, &AnalyticsQuery::Statistics).unwrap(),
            AnalyticsResponse::Statistics(_)
        ));
        assert!(matches!(
            execute(&ds, &AnalyticsQuery::CorrelationMatrix).unwrap(),
            AnalyticsResponse::CorrelationMatrix(_)
        ));
        let cond = ConditionalQuery::from_params(&params(Some("8"), Some("1"))).unwrap();
        assert!(matches!(
            execute(&ds, &AnalyticsQuery::Conditional(cond)).unwrap(),
            AnalyticsResponse::Conditional(ConditionalProbability { probability, .. }) if probability == 1.0
        ));
        let bq = BayesQuery::from_params(&bayes_params("q8", "1", "8")).unwrap();
        assert!(matches!(
            execute(&ds, &AnalyticsQuery::Bayes(bq)).unwrap(),
            AnalyticsResponse::Bayes(_)
        ));
    }

    #[test]
    fn repeated_queries_are_identical() {
        let ds = Dataset::new(vec![
            record_from_bits(1, [1, 0, 1, 0, 1, 0, 1, 0, 1, 0]).unwrap(),
            record_from_bits(2, [0, 1, 1, 0, 0, 1, 1, 0, 0, 1]).unwrap(),
            record_from_bits(3, [1, 1, 0, 0, 1, 1, 0, 0, 1, 1]).unwrap(),
        ])
        .unwrap();
        for q in [AnalyticsQuery::Statistics, AnalyticsQuery::CorrelationMatrix] {
            assert_eq!(execute(&ds, &q).unwrap(), execute(&ds, &q).unwrap());
        }
    }

    #[test]
    fn empty_dataset_rejects_analytics_but_lists_no_grades() {
        let ds = Dataset::empty();
        let conditional = ConditionalQuery::from_params(&params(Some("1"), Some("1"))).unwrap();
        let bayes = BayesQuery::from_params(&bayes_params("q1", "1", "0")).unwrap();
        for q in [
            AnalyticsQuery::Statistics,
            AnalyticsQuery::CorrelationMatrix,
            AnalyticsQuery::Conditional(conditional),
            AnalyticsQuery::Bayes(bayes),
        ] {
            assert_eq!(execute(&ds, &q), Err(AnalyticsError::EmptyDataset), "{q:?}");
        }
        assert_eq!(
            execute(&ds, &AnalyticsQuery::Grades),
            Ok(AnalyticsResponse::Grades(vec![]))
        );
    }
}

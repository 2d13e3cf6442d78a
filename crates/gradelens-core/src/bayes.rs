//! Posterior probability of reaching a score threshold after observing one
//! item's outcome.
//!
//! With A = "total ≥ threshold" and B = "response[condition] = value":
//!
//! - prior      P(A)   = count(A) / n
//! - evidence   P(B)   = count(B) / n
//! - likelihood P(B|A) = count(A ∧ B) / count(A)
//! - posterior  P(A|B) = count(A ∧ B) / count(B)
//!
//! The posterior is counted directly; [`BayesUpdate::posterior_from_bayes_rule`]
//! recomputes it as P(B|A)·P(A)/P(B) and the two agree up to rounding.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::model::{ItemIndex, Outcome, Threshold};

/// A validated Bayesian update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BayesQuery {
    pub condition: ItemIndex,
    pub value: Outcome,
    pub threshold: Threshold,
}

/// Prior, likelihood, and posterior for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesUpdate {
    pub condition: ItemIndex,
    pub condition_value: Outcome,
    pub threshold: Threshold,
    pub prior_probability: f64,
    pub likelihood_probability: f64,
    pub posterior_probability: f64,
    pub evidence_probability: f64,
    pub condition_met_count: usize,
    pub threshold_met_count: usize,
    pub both_conditions_met_count: usize,
}

impl BayesUpdate {
    /// P(B|A)·P(A)/P(B), the posterior derived through Bayes' rule.
    pub fn posterior_from_bayes_rule(&self) -> f64 {
        self.likelihood_probability * self.prior_probability / self.evidence_probability
    }
}

/// Run a Bayesian update against a dataset.
///
/// Fails with `UndefinedResult` when no student matches the observed
/// outcome (posterior undefined) or no student reaches the threshold
/// (likelihood undefined). A partial update is never returned: the response
/// shape always carries all three probabilities, and a zero denominator must
/// not be reported as a probability of zero.
pub fn bayes_update(dataset: &Dataset, query: &BayesQuery) -> Result<BayesUpdate> {
    let n = dataset.require_records()?;
    let BayesQuery {
        condition,
        value,
        threshold,
    } = *query;

    let mut condition_met_count = 0usize;
    let mut threshold_met_count = 0usize;
    let mut both_conditions_met_count = 0usize;
    for record in dataset.records() {
        let observed = record.response(condition) == value;
        let reached = threshold.is_met_by(record.total);
        condition_met_count += usize::from(observed);
        threshold_met_count += usize::from(reached);
        both_conditions_met_count += usize::from(observed && reached);
    }

    if condition_met_count == 0 {
        return Err(AnalyticsError::UndefinedResult(format!(
            "no student has {} = {value}, so the posterior is undefined",
            condition.label()
        )));
    }
    if threshold_met_count == 0 {
        return Err(AnalyticsError::UndefinedResult(format!(
            "no student scored {} or more, so the likelihood is undefined",
            threshold.value()
        )));
    }

    let n = n as f64;
    let update = BayesUpdate {
        condition,
        condition_value: value,
        threshold,
        prior_probability: threshold_met_count as f64 / n,
        likelihood_probability: both_conditions_met_count as f64 / threshold_met_count as f64,
        posterior_probability: both_conditions_met_count as f64 / condition_met_count as f64,
        evidence_probability: condition_met_count as f64 / n,
        condition_met_count,
        threshold_met_count,
        both_conditions_met_count,
    };

    tracing::debug!(
        condition = %condition,
        value = %value,
        threshold = threshold.value(),
        posterior = update.posterior_probability,
        "bayes update"
    );

    Ok(update)
}
